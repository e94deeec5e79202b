/// Events emitted by game transitions.
/// The presentation layer consumes these for announcements and sound.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Activated,
    Selected { index: usize },
    Swapped { from: usize, to: usize },
    Solved,
    WrongOrder { remaining: u32 },
    OutOfAttempts,
    Revealed,
    Pronounce { text: String, lang: &'static str },
}
