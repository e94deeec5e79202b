/// Rearrangement surface: input-agnostic interaction state for the tile row.
///
/// Two adapters feed the same `GameState::swap`:
///   - pointer drag:    `begin_drag(i)` then `drop_on(j)`
///   - discrete select: `select(i)` twice (keyboard, gamepad, mouse click)
///
/// The audio affordance (`play_audio`) never touches selection or drag state.

use crate::domain::symbol::SPEECH_LANG;
use crate::sim::event::GameEvent;
use crate::sim::game::GameState;

/// Visual state of one tile.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TileMark {
    Neutral,
    Selected,
    Correct,
    Wrong,
}

pub struct Surface {
    /// Tile chosen by the first half of a discrete select.
    pub pending: Option<usize>,
    /// Source tile of a pointer drag in progress.
    pub drag_source: Option<usize>,
    /// Keyboard / gamepad focus.
    pub cursor: usize,
    /// Activation this state belongs to.
    activation: u64,
}

impl Surface {
    pub fn new() -> Self {
        Surface { pending: None, drag_source: None, cursor: 0, activation: 0 }
    }

    /// Drop per-activation state when the game has been (re)activated.
    pub fn sync(&mut self, game: &GameState) {
        if self.activation != game.activation {
            self.activation = game.activation;
            self.pending = None;
            self.drag_source = None;
            self.cursor = 0;
        }
        if !game.order.is_empty() && self.cursor >= game.order.len() {
            self.cursor = game.order.len() - 1;
        }
    }

    // ── Discrete-select adapter ──

    pub fn select(&mut self, game: &mut GameState, index: usize) -> Vec<GameEvent> {
        self.sync(game);
        if !game.is_in_progress() || index >= game.order.len() {
            return vec![];
        }
        match self.pending {
            None => {
                self.pending = Some(index);
                vec![GameEvent::Selected { index }]
            }
            Some(p) if p == index => {
                self.pending = None;
                vec![]
            }
            Some(p) => {
                self.pending = None;
                swap_event(game, p, index)
            }
        }
    }

    pub fn select_cursor(&mut self, game: &mut GameState) -> Vec<GameEvent> {
        let idx = self.cursor;
        self.select(game, idx)
    }

    pub fn move_cursor(&mut self, game: &GameState, delta: isize) {
        self.sync(game);
        let len = game.order.len();
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor as isize + delta).rem_euclid(len as isize) as usize;
    }

    // ── Pointer-drag adapter ──

    pub fn begin_drag(&mut self, game: &GameState, index: usize) {
        self.sync(game);
        if !game.is_in_progress() || index >= game.order.len() {
            return;
        }
        self.drag_source = Some(index);
    }

    /// Finish a drag over `index`. Dropping on the source tile swaps nothing.
    pub fn drop_on(&mut self, game: &mut GameState, index: usize) -> Vec<GameEvent> {
        self.sync(game);
        let src = match self.drag_source.take() {
            Some(s) => s,
            None => return vec![],
        };
        if !game.is_in_progress() || src == index {
            return vec![];
        }
        self.pending = None;
        swap_event(game, src, index)
    }

    pub fn cancel_drag(&mut self) {
        self.drag_source = None;
    }

    // ── Audio affordance ──

    pub fn play_audio(&self, game: &GameState, index: usize) -> Option<GameEvent> {
        game.order.get(index).map(|s| GameEvent::Pronounce {
            text: s.pronunciation(),
            lang: SPEECH_LANG,
        })
    }

    // ── Rendering ──

    pub fn mark(&self, game: &GameState, index: usize) -> TileMark {
        let highlighted = self.activation == game.activation
            && (self.pending == Some(index) || self.drag_source == Some(index));
        if highlighted {
            TileMark::Selected
        } else if game.feedback_visible() {
            if game.is_correct_at(index) { TileMark::Correct } else { TileMark::Wrong }
        } else {
            TileMark::Neutral
        }
    }
}

fn swap_event(game: &mut GameState, from: usize, to: usize) -> Vec<GameEvent> {
    if game.swap(from, to) {
        vec![GameEvent::Swapped { from, to }]
    } else {
        vec![]
    }
}

/// Level menu overlay: a cursor over the level table.
pub struct LevelMenu {
    pub open: bool,
    pub cursor: usize,
}

impl LevelMenu {
    pub fn new() -> Self {
        LevelMenu { open: false, cursor: 0 }
    }

    pub fn open_at(&mut self, current: usize) {
        self.open = true;
        self.cursor = current;
    }

    pub fn move_cursor(&mut self, delta: isize, total: usize) {
        if total == 0 {
            return;
        }
        self.cursor = (self.cursor as isize + delta).rem_euclid(total as isize) as usize;
    }

    /// Close the menu, returning the chosen level.
    pub fn choose(&mut self) -> usize {
        self.open = false;
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::curriculum::{level_index, levels};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Instant;

    fn game() -> GameState {
        let mut g = GameState::new();
        g.activate(level_index("k-varga").unwrap(), &mut StdRng::seed_from_u64(3));
        g
    }

    fn glyphs(g: &GameState) -> Vec<&'static str> {
        g.order.iter().map(|s| s.glyph).collect()
    }

    #[test]
    fn select_twice_swaps() {
        let mut g = game();
        let mut s = Surface::new();
        let before = glyphs(&g);

        assert_eq!(s.select(&mut g, 0), vec![GameEvent::Selected { index: 0 }]);
        assert_eq!(s.mark(&g, 0), TileMark::Selected);
        assert_eq!(s.select(&mut g, 3), vec![GameEvent::Swapped { from: 0, to: 3 }]);
        assert_eq!(s.pending, None);

        let after = glyphs(&g);
        assert_eq!(after[0], before[3]);
        assert_eq!(after[3], before[0]);
    }

    #[test]
    fn select_same_tile_deselects() {
        let mut g = game();
        let mut s = Surface::new();
        let before = glyphs(&g);
        s.select(&mut g, 2);
        assert!(s.select(&mut g, 2).is_empty());
        assert_eq!(s.pending, None);
        assert_eq!(glyphs(&g), before);
        assert_eq!(s.mark(&g, 2), TileMark::Neutral);
    }

    #[test]
    fn drag_and_select_produce_same_order() {
        let mut a = game();
        let mut b = game();
        let mut sa = Surface::new();
        let mut sb = Surface::new();

        sa.begin_drag(&a, 1);
        sa.drop_on(&mut a, 4);

        sb.select(&mut b, 1);
        sb.select(&mut b, 4);

        assert_eq!(glyphs(&a), glyphs(&b));
    }

    #[test]
    fn drop_on_source_is_noop() {
        let mut g = game();
        let mut s = Surface::new();
        let before = glyphs(&g);
        s.begin_drag(&g, 2);
        assert!(s.drop_on(&mut g, 2).is_empty());
        assert_eq!(glyphs(&g), before);
        assert_eq!(s.drag_source, None);
    }

    #[test]
    fn drop_without_drag_is_noop() {
        let mut g = game();
        let mut s = Surface::new();
        let before = glyphs(&g);
        assert!(s.drop_on(&mut g, 1).is_empty());
        assert_eq!(glyphs(&g), before);
    }

    #[test]
    fn audio_leaves_selection_alone() {
        let mut g = game();
        let mut s = Surface::new();
        s.select(&mut g, 1);
        let ev = s.play_audio(&g, 3).unwrap();
        match ev {
            GameEvent::Pronounce { text, lang } => {
                assert!(text.starts_with(g.order[3].glyph));
                assert!(text.contains(" से "));
                assert_eq!(lang, "hi-IN");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(s.pending, Some(1));
        assert!(s.play_audio(&g, 99).is_none());
    }

    #[test]
    fn won_game_disables_interaction() {
        let mut g = game();
        let mut s = Surface::new();
        g.order.sort_by_key(|sym| sym.correct_index);
        g.validate(Instant::now());

        assert!(s.select(&mut g, 0).is_empty());
        s.begin_drag(&g, 0);
        assert_eq!(s.drag_source, None);
        for i in 0..g.order.len() {
            assert_eq!(s.mark(&g, i), TileMark::Correct);
        }
    }

    #[test]
    fn marks_follow_feedback_and_clear_on_swap() {
        let mut g = game();
        let mut s = Surface::new();
        g.order.sort_by_key(|sym| sym.correct_index);
        g.swap(0, 1);
        g.validate(Instant::now());

        assert_eq!(s.mark(&g, 0), TileMark::Wrong);
        assert_eq!(s.mark(&g, 1), TileMark::Wrong);
        assert_eq!(s.mark(&g, 2), TileMark::Correct);

        s.select(&mut g, 0);
        s.select(&mut g, 1);
        assert_eq!(s.mark(&g, 0), TileMark::Neutral);
        assert_eq!(s.mark(&g, 2), TileMark::Neutral);
    }

    #[test]
    fn reactivation_clears_pending() {
        let mut g = game();
        let mut s = Surface::new();
        s.select(&mut g, 1);
        s.cursor = 3;
        g.reset(&mut StdRng::seed_from_u64(9));
        s.sync(&g);
        assert_eq!(s.pending, None);
        assert_eq!(s.cursor, 0);
        assert_eq!(s.mark(&g, 1), TileMark::Neutral);
    }

    #[test]
    fn cursor_wraps() {
        let g = game();
        let mut s = Surface::new();
        s.move_cursor(&g, -1);
        assert_eq!(s.cursor, 4);
        s.move_cursor(&g, 1);
        assert_eq!(s.cursor, 0);
    }

    #[test]
    fn level_menu_wraps_and_chooses() {
        let mut m = LevelMenu::new();
        m.open_at(0);
        m.move_cursor(-1, levels().len());
        assert_eq!(m.cursor, levels().len() - 1);
        assert_eq!(m.choose(), levels().len() - 1);
        assert!(!m.open);
    }
}
