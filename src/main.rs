/// Entry point and game loop.

mod config;
mod domain;
mod hint;
mod logging;
mod sim;
mod ui;

use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, MouseButton, MouseEventKind};
use rand::rngs::ThreadRng;
use rand::Rng;
use tracing::{error, info, warn};

use config::GameConfig;
use domain::curriculum::{level_index, levels};
use domain::symbol::SPEECH_LANG;
use hint::gemini::GeminiClient;
use hint::{HintAssistant, TextGenerator};
use sim::event::GameEvent;
use sim::game::{GameState, Phase};
use sim::surface::{LevelMenu, Surface};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{Hit, Renderer, View};
use ui::sound::SoundEngine;
use ui::speech::Speaker;

const SAY_SOLVED: &str = "बहुत बढ़िया! (Excellent!)";
const SAY_LOST: &str = "Correct answer is here.";
const SAY_RETRY: &str = "Try again";

/// Everything the loop mutates between frames.
struct App {
    game: GameState,
    surface: Surface,
    menu: LevelMenu,
    hint: HintAssistant,
    speaker: Speaker,
    sound: Option<SoundEngine>,
    rng: ThreadRng,
    /// Level the title screen starts into.
    start_level: usize,
}

fn main() {
    let config = GameConfig::load();

    let _log_guard = match logging::init(&config.general.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {e}");
            None
        }
    };
    for w in &config.warnings {
        warn!("{w}");
    }
    if config.hint.api_key.is_none() {
        warn!(var = %config.hint.api_key_env, "no API key set; hints will show the setup message");
    }
    info!(
        model = %config.hint.model,
        api_key = config.hint.api_key.is_some(),
        speech = config.speech.enabled,
        "starting"
    );

    if let Err(e) = run(&config) {
        error!(error = %e, "game aborted");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("धन्यवाद! Thanks for playing Varnamala.");
}

fn run(config: &GameConfig) -> Result<(), Box<dyn Error>> {
    // Hint requests run here; the game loop itself stays synchronous.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("varnamala-hint")
        .enable_all()
        .build()?;

    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(&config.hint)?);

    let sound = if config.sound_enabled { SoundEngine::new() } else { None };

    let mut app = App {
        game: GameState::new(),
        surface: Surface::new(),
        menu: LevelMenu::new(),
        hint: HintAssistant::new(generator, runtime.handle().clone()),
        speaker: Speaker::new(&config.speech),
        sound,
        rng: rand::thread_rng(),
        start_level: level_index(&config.general.start_level).unwrap_or(0),
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        let _ = renderer.cleanup();
        return Err(e.into());
    }

    let result = game_loop(&mut app, &mut renderer, config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    // Don't wait on a hint request still in flight.
    runtime.shutdown_background();
    result
}

fn game_loop(app: &mut App, renderer: &mut Renderer, config: &GameConfig) -> Result<(), Box<dyn Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let frame = Duration::from_millis(config.general.frame_rate_ms);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        let mut events = Vec::new();
        if handle_meta(app, renderer, &kb, &gp, &mut events) {
            break;
        }
        handle_mouse(app, renderer, &kb, &mut events);

        events.extend(app.game.tick(Instant::now()));
        app.hint.sync(app.game.activation);
        app.hint.poll();
        app.surface.sync(&app.game);
        app.game.tick_message();

        process_audio_events(&mut app.speaker, app.sound.as_ref(), &events);

        renderer.render(&View {
            game: &app.game,
            surface: &app.surface,
            hint: &app.hint,
            menu: &app.menu,
            gamepad: gp.connected,
        })?;
        std::thread::sleep(frame);
    }

    info!("quit");
    Ok(())
}

fn process_audio_events(speaker: &mut Speaker, sound: Option<&SoundEngine>, events: &[GameEvent]) {
    for event in events {
        // ── Chimes ──
        if let Some(sfx) = sound {
            match event {
                GameEvent::Selected { .. } => sfx.play_select(),
                GameEvent::Swapped { .. } => sfx.play_swap(),
                GameEvent::Solved => sfx.play_correct(),
                GameEvent::WrongOrder { .. } => sfx.play_wrong(),
                GameEvent::OutOfAttempts => sfx.play_lost(),
                GameEvent::Revealed => sfx.play_reveal(),
                _ => {}
            }
        }

        // ── Speech ──
        match event {
            GameEvent::Solved => speaker.speak(SAY_SOLVED, SPEECH_LANG),
            GameEvent::OutOfAttempts => speaker.speak(SAY_LOST, SPEECH_LANG),
            GameEvent::WrongOrder { .. } => speaker.speak(SAY_RETRY, SPEECH_LANG),
            GameEvent::Pronounce { text, lang } => speaker.speak(text, lang),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_CHECK: &[KeyCode] = &[KeyCode::Char('c'), KeyCode::Char('C')];
const KEYS_HINT: &[KeyCode] = &[KeyCode::Char('h'), KeyCode::Char('H')];
const KEYS_LISTEN: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P'), KeyCode::Char('v'), KeyCode::Char('V')];
const KEYS_NEXT: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N')];
const KEYS_RESET: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_LEVELS: &[KeyCode] = &[KeyCode::Char('l'), KeyCode::Char('L')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

/// Keyboard and gamepad commands. Returns true to quit.
fn handle_meta(
    app: &mut App,
    renderer: &Renderer,
    kb: &InputState,
    gp: &GamepadState,
    events: &mut Vec<GameEvent>,
) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.select_pressed();
    let cancel = kb.was_pressed(KeyCode::Esc) || gp.cancel_pressed();
    let up = kb.any_pressed(KEYS_UP) || gp.up_pressed();
    let down = kb.any_pressed(KEYS_DOWN) || gp.down_pressed();

    // ── Level menu (modal) ──
    if app.menu.open {
        let total = levels().len();
        if up {
            app.menu.move_cursor(-1, total);
        }
        if down {
            app.menu.move_cursor(1, total);
        }
        if confirm {
            let idx = app.menu.choose();
            events.extend(app.game.select_level(idx, &mut app.rng));
        } else if cancel || kb.any_pressed(KEYS_LEVELS) {
            app.menu.open = false;
        }
        return false;
    }

    if kb.any_pressed(KEYS_QUIT) {
        return true;
    }
    if kb.any_pressed(KEYS_LEVELS) {
        app.menu.open_at(app.game.level_idx);
        return false;
    }

    // ── Title ──
    if app.game.phase == Phase::NotStarted {
        if confirm || gp.next_pressed() {
            events.extend(app.game.activate(app.start_level, &mut app.rng));
            return false;
        }
        return cancel;
    }

    if cancel {
        return peel_escape(&mut app.hint, &mut app.surface);
    }

    // ── Level transitions ──
    let proceed = confirm || gp.next_pressed();
    let keys = TransitionKeys {
        next: kb.any_pressed(KEYS_NEXT),
        reset: kb.any_pressed(KEYS_RESET),
        proceed,
    };
    if let Some(evs) = level_transition(&mut app.game, &mut app.rng, keys) {
        events.extend(evs);
        return false;
    }

    // ── Board ──
    if kb.any_pressed(KEYS_HINT) || gp.hint_pressed() {
        let level = app.game.level();
        app.hint.toggle(level, app.game.activation);
    }
    if kb.any_pressed(KEYS_CHECK) || gp.check_pressed() {
        events.extend(app.game.validate(Instant::now()));
    }
    if kb.any_pressed(KEYS_LISTEN) || gp.listen_pressed() {
        events.extend(app.surface.play_audio(&app.game, app.surface.cursor));
    }

    let cols = renderer.columns() as isize;
    if kb.any_pressed(KEYS_LEFT) || gp.left_pressed() {
        app.surface.move_cursor(&app.game, -1);
    }
    if kb.any_pressed(KEYS_RIGHT) || gp.right_pressed() {
        app.surface.move_cursor(&app.game, 1);
    }
    if up {
        app.surface.move_cursor(&app.game, -cols);
    }
    if down {
        app.surface.move_cursor(&app.game, cols);
    }
    if confirm {
        events.extend(app.surface.select_cursor(&mut app.game));
    }

    false
}

/// Escape closes the hint panel first, then drops a pending selection or
/// drag. Returns true when there was nothing left to close.
fn peel_escape(hint: &mut HintAssistant, surface: &mut Surface) -> bool {
    if hint.visible {
        hint.hide();
    } else if surface.pending.is_some() || surface.drag_source.is_some() {
        surface.pending = None;
        surface.cancel_drag();
    } else {
        return true;
    }
    false
}

#[derive(Clone, Copy, Default)]
struct TransitionKeys {
    next: bool,
    reset: bool,
    /// Confirm or gamepad Start: moves on from Won and Lost alike.
    proceed: bool,
}

/// Won advances, Lost restarts, reset restarts from any phase.
fn level_transition<R: Rng + ?Sized>(
    game: &mut GameState,
    rng: &mut R,
    keys: TransitionKeys,
) -> Option<Vec<GameEvent>> {
    if game.phase == Phase::Won && (keys.next || keys.proceed) {
        return Some(game.advance(rng));
    }
    if keys.reset || (game.phase == Phase::Lost && keys.proceed) {
        return Some(game.reset(rng));
    }
    None
}

fn handle_mouse(app: &mut App, renderer: &Renderer, kb: &InputState, events: &mut Vec<GameEvent>) {
    if app.menu.open || app.game.phase == Phase::NotStarted {
        return;
    }

    for m in &kb.mouse {
        let hit = renderer.hit_test(m.column, m.row);
        events.extend(route_pointer(&mut app.game, &mut app.surface, m.kind, hit));
    }
}

/// Pointer adapter: press on a tile starts a drag, release over another
/// tile drops it, release over the same tile counts as a click. Pressing
/// `♪` only pronounces.
fn route_pointer(
    game: &mut GameState,
    surface: &mut Surface,
    kind: MouseEventKind,
    hit: Option<Hit>,
) -> Vec<GameEvent> {
    match kind {
        MouseEventKind::Down(MouseButton::Left) => match hit {
            Some(Hit::Audio(i)) => surface.play_audio(game, i).into_iter().collect(),
            Some(Hit::Tile(i)) => {
                surface.cursor = i;
                surface.begin_drag(game, i);
                vec![]
            }
            None => vec![],
        },
        MouseEventKind::Up(MouseButton::Left) => {
            let Some(src) = surface.drag_source else {
                return vec![];
            };
            match hit {
                Some(Hit::Tile(i) | Hit::Audio(i)) if i != src => {
                    let events = surface.drop_on(game, i);
                    surface.cursor = i;
                    events
                }
                Some(Hit::Tile(i) | Hit::Audio(i)) => {
                    surface.cancel_drag();
                    surface.select(game, i)
                }
                None => {
                    surface.cancel_drag();
                    vec![]
                }
            }
        }
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::hint::HintError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::runtime::Handle;

    const DOWN: MouseEventKind = MouseEventKind::Down(MouseButton::Left);
    const UP: MouseEventKind = MouseEventKind::Up(MouseButton::Left);

    struct Silent;

    #[async_trait]
    impl TextGenerator for Silent {
        async fn generate(&self, _: &[&str], _: &str) -> Result<String, HintError> {
            Ok(String::new())
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    fn started() -> (GameState, Surface) {
        let mut game = GameState::new();
        game.activate(level_index("k-varga").unwrap(), &mut rng());
        let mut surface = Surface::new();
        surface.sync(&game);
        (game, surface)
    }

    fn glyphs(game: &GameState) -> Vec<&'static str> {
        game.order.iter().map(|s| s.glyph).collect()
    }

    fn solve(game: &mut GameState) {
        for pos in 0..game.order.len() {
            let at = game.order.iter().position(|s| s.belongs_at(pos)).unwrap();
            game.swap(pos, at);
        }
    }

    fn lose(game: &mut GameState) {
        solve(game);
        game.swap(0, 1);
        for _ in 0..3 {
            game.validate(Instant::now());
        }
        assert_eq!(game.phase, Phase::Lost);
    }

    #[test]
    fn audio_press_only_pronounces() {
        let (mut game, mut surface) = started();
        let before = glyphs(&game);
        let events = route_pointer(&mut game, &mut surface, DOWN, Some(Hit::Audio(2)));
        assert!(matches!(events.as_slice(), [GameEvent::Pronounce { .. }]));
        assert_eq!(surface.pending, None);
        assert_eq!(surface.drag_source, None);

        // Releasing afterwards has no drag to finish.
        assert!(route_pointer(&mut game, &mut surface, UP, Some(Hit::Tile(4))).is_empty());
        assert_eq!(glyphs(&game), before);
    }

    #[test]
    fn release_on_source_tile_is_a_click() {
        let (mut game, mut surface) = started();
        assert!(route_pointer(&mut game, &mut surface, DOWN, Some(Hit::Tile(1))).is_empty());
        assert_eq!(surface.drag_source, Some(1));

        let events = route_pointer(&mut game, &mut surface, UP, Some(Hit::Tile(1)));
        assert_eq!(events, vec![GameEvent::Selected { index: 1 }]);
        assert_eq!(surface.pending, Some(1));
        assert_eq!(surface.drag_source, None);
    }

    #[test]
    fn release_on_other_tile_swaps() {
        let (mut game, mut surface) = started();
        let before = glyphs(&game);
        route_pointer(&mut game, &mut surface, DOWN, Some(Hit::Tile(0)));
        let events = route_pointer(&mut game, &mut surface, UP, Some(Hit::Audio(3)));
        assert_eq!(events, vec![GameEvent::Swapped { from: 0, to: 3 }]);
        assert_eq!(glyphs(&game)[0], before[3]);
        assert_eq!(glyphs(&game)[3], before[0]);
        assert_eq!(surface.cursor, 3);
        assert_eq!(surface.drag_source, None);
    }

    #[test]
    fn release_off_the_board_cancels_drag() {
        let (mut game, mut surface) = started();
        let before = glyphs(&game);
        route_pointer(&mut game, &mut surface, DOWN, Some(Hit::Tile(2)));
        assert!(route_pointer(&mut game, &mut surface, UP, None).is_empty());
        assert_eq!(surface.drag_source, None);
        assert_eq!(glyphs(&game), before);
    }

    #[tokio::test]
    async fn escape_peels_hint_then_selection_then_quits() {
        let (mut game, mut surface) = started();
        let mut hint = HintAssistant::new(Arc::new(Silent), Handle::current());
        hint.toggle(game.level(), game.activation);
        surface.select(&mut game, 0);

        assert!(!peel_escape(&mut hint, &mut surface));
        assert!(!hint.visible);
        assert_eq!(surface.pending, Some(0));

        assert!(!peel_escape(&mut hint, &mut surface));
        assert_eq!(surface.pending, None);

        assert!(peel_escape(&mut hint, &mut surface));
    }

    #[test]
    fn won_advances_and_lost_restarts() {
        let (mut game, _) = started();
        let proceed = TransitionKeys { proceed: true, ..Default::default() };

        // Mid-level, confirm is left to the board.
        assert!(level_transition(&mut game, &mut rng(), proceed).is_none());

        solve(&mut game);
        game.validate(Instant::now());
        assert_eq!(game.phase, Phase::Won);
        let next = TransitionKeys { next: true, ..Default::default() };
        assert_eq!(level_transition(&mut game, &mut rng(), next), Some(vec![GameEvent::Activated]));
        assert_eq!(game.level().id, "ch-varga");

        lose(&mut game);
        let activation = game.activation;
        assert!(level_transition(&mut game, &mut rng(), next).is_none());
        assert!(level_transition(&mut game, &mut rng(), proceed).is_some());
        assert_eq!(game.level().id, "ch-varga");
        assert_eq!(game.phase, Phase::InProgress);
        assert!(game.activation > activation);
    }

    #[test]
    fn reset_works_mid_level() {
        let (mut game, _) = started();
        game.validate(Instant::now());
        let reset = TransitionKeys { reset: true, ..Default::default() };
        assert!(level_transition(&mut game, &mut rng(), reset).is_some());
        assert_eq!(game.attempts, crate::sim::game::MAX_ATTEMPTS);
    }
}
