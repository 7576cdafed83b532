use crate::chunk::Segment;

/// One pause second per this many characters of the preceding segment.
const CHARS_PER_PAUSE_SECOND: usize = 300;
/// Computed inter-segment pauses never leave this range.
const MIN_PAUSE_SECS: u64 = 1;
const MAX_PAUSE_SECS: u64 = 5;

/// Pacing configuration for multi-part replies.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    /// Body of the placeholder sent ahead of a multi-part reply.
    pub filler_text: String,
    /// Pause, in seconds, between the filler and the first real part.
    pub filler_delay_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            filler_text: "...".into(),
            filler_delay_secs: 2,
        }
    }
}

/// One deliverable unit of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedItem {
    /// Placeholder that simulates composing time before a long reply.
    Filler { body: String },
    /// A real reply segment.
    Part(Segment),
}

impl PlannedItem {
    pub fn body(&self) -> &str {
        match self {
            PlannedItem::Filler { body } => body,
            PlannedItem::Part(segment) => &segment.body,
        }
    }
}

/// A deliverable unit plus the pause rendered before sending it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledItem {
    pub item: PlannedItem,
    /// Seconds to pause before delivering this item; zero means deliver
    /// immediately.
    pub delay_secs: u64,
}

/// Ordered delivery schedule for one reply. The delays are declarative:
/// they are rendered into the outbound envelope for the channel to
/// honor, never slept on in-process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryPlan {
    pub items: Vec<ScheduledItem>,
}

impl DeliveryPlan {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Real reply segments in delivery order, filler excluded.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.items.iter().filter_map(|entry| match &entry.item {
            PlannedItem::Part(segment) => Some(segment),
            PlannedItem::Filler { .. } => None,
        })
    }
}

/// Schedule segments for delivery.
///
/// A single segment is delivered immediately with no filler. Two or more
/// segments are led by the configured filler, then the first real part
/// after the configured filler pause, then each further part after a
/// pause proportional to how long the previous part was.
pub fn schedule(segments: Vec<Segment>, config: &PacingConfig) -> DeliveryPlan {
    let multi = segments.len() >= 2;
    let mut items = Vec::with_capacity(segments.len() + usize::from(multi));

    if multi {
        items.push(ScheduledItem {
            item: PlannedItem::Filler {
                body: config.filler_text.clone(),
            },
            delay_secs: 0,
        });
    }

    let mut prev_chars = 0usize;
    for (i, segment) in segments.into_iter().enumerate() {
        let delay_secs = if i == 0 {
            if multi { config.filler_delay_secs } else { 0 }
        } else {
            typing_pause(prev_chars)
        };
        prev_chars = segment.body.chars().count();
        items.push(ScheduledItem {
            item: PlannedItem::Part(segment),
            delay_secs,
        });
    }

    DeliveryPlan { items }
}

fn typing_pause(prev_chars: usize) -> u64 {
    ((prev_chars / CHARS_PER_PAUSE_SECOND) as u64).clamp(MIN_PAUSE_SECS, MAX_PAUSE_SECS)
}
