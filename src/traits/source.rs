use crate::channel::Rank;

/// Lazily produced events for one worker.
pub type EventStream<E> = Box<dyn Iterator<Item = E> + Send>;

/// Facility and detector collaborators consumed by the worker loop.
///
/// The engine never looks inside an event. It asks the source for the worker's share
/// of the events, filters them, opens each one, builds a frame view for each frame it
/// wants and closes the event again.
pub trait EventSource: Send {
    /// Handle to one unit of source data.
    type Event: Send;
    /// An event after it has been opened.
    type Opened: Send;
    /// View of a single frame within an opened event.
    type Frame;

    /// Events assigned to `rank` out of `group_size` processes. Partitioning across the
    /// group is the source's responsibility.
    fn events(
        &self,
        source: &str,
        rank: Rank,
        group_size: usize,
    ) -> anyhow::Result<EventStream<Self::Event>>;

    /// `true` if the event should be skipped without being opened.
    fn reject(&self, _event: &Self::Event) -> bool {
        false
    }

    fn num_frames(&self, event: &Self::Event) -> usize;

    fn open(&self, event: Self::Event) -> anyhow::Result<Self::Opened>;

    fn close(&self, opened: Self::Opened) -> anyhow::Result<()>;

    /// Build the view of frame `index` (0-based, in arrival order).
    fn frame(&self, opened: &Self::Opened, index: usize) -> Self::Frame;
}
