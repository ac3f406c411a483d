//! Event Horizon entry point
//!
//! The browser build is driven from JS through `platform::web::WebGame`.
//! Natively this runs a headless autopilot session and logs what happens.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::time::{SystemTime, UNIX_EPOCH};

    use glam::Vec2;

    use event_horizon::persistence::FileStore;
    use event_horizon::sim::{GameEvent, SessionState, TickInput};
    use event_horizon::{Session, Tuning};

    const FRAME_DT: f32 = 1.0 / 60.0;

    /// Command line: `event-horizon [seconds] [seed] [classic|star_field|<tuning.json>]`
    struct Args {
        seconds: f32,
        seed: u64,
        tuning: Tuning,
    }

    fn parse_args() -> Args {
        let mut args = std::env::args().skip(1);
        let seconds = args
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60.0_f32)
            .max(0.0);
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
        let tuning = match args.next().as_deref() {
            None | Some("classic") => Tuning::classic(),
            Some("star_field") => Tuning::star_field(),
            Some(path) => load_tuning(path),
        };
        Args {
            seconds,
            seed,
            tuning,
        }
    }

    fn load_tuning(path: &str) -> Tuning {
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| Tuning::from_json(&text).map_err(|e| e.to_string()));
        match parsed {
            Ok(tuning) => tuning,
            Err(err) => {
                log::warn!("could not load tuning from {path} ({err}); using classic");
                Tuning::classic()
            }
        }
    }

    /// Hold an orbit just outside the near-miss window, bank after a while
    fn autopilot(state: &SessionState, tuning: &Tuning) -> TickInput {
        let pos = state.player.body.pos;
        let r = pos.length();
        if !state.is_running() || r < 1.0 {
            return TickInput::default();
        }
        let outward = pos / r;
        let tangent = Vec2::new(-outward.y, outward.x);
        let target = tuning.near_miss_outer() + 20.0;

        let radial = ((target - r) / target).clamp(-1.0, 1.0);
        let speed_along = state.player.body.vel.dot(tangent);
        let orbital = (tuning.gravity * tuning.black_hole_mass / r).sqrt();
        let tangential = ((orbital - speed_along) / orbital.max(1.0)).clamp(-1.0, 1.0);

        TickInput {
            thrust: outward * radial + tangent * tangential,
            boost: r < tuning.event_horizon * 1.5,
            cash_out: state.round_time > 8.0,
            restart: false,
        }
    }

    fn describe(event: &GameEvent, round: u64) {
        match event {
            GameEvent::Escaped {
                final_score,
                bonus_applied,
                new_best,
            } => log::info!(
                "round {round}: escaped with {final_score:.0}{}{}",
                if *bonus_applied { " (near-miss bonus)" } else { "" },
                if *new_best { ", new best" } else { "" }
            ),
            GameEvent::Absorbed { lost_score } => {
                log::info!("round {round}: absorbed, lost {lost_score:.0}")
            }
            GameEvent::Collided { lost_score } => {
                log::info!("round {round}: hit a star, lost {lost_score:.0}")
            }
            GameEvent::OutOfBounds { lost_score } => {
                log::info!("round {round}: drifted out of bounds, lost {lost_score:.0}")
            }
            GameEvent::NearMiss => log::info!("round {round}: near miss"),
        }
    }

    pub fn run() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!("Event Horizon (native, headless) starting...");

        let args = parse_args();
        let dir = std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir());
        let store = FileStore::in_dir(dir);
        log::info!("best score file: {}", store.path().display());

        let mut session = Session::new(args.seed, args.tuning, Box::new(store));
        let frames = (args.seconds / FRAME_DT).round() as u64;
        for _ in 0..frames {
            let input = autopilot(session.state(), session.tuning());
            let round = session.state().round;
            for event in session.step(&input, FRAME_DT) {
                describe(&event, round);
            }
        }

        let state = session.state();
        log::info!(
            "done after {} rounds: banked {:.0}, best {:.0}{}",
            state.round,
            state.total_banked,
            state.best_score,
            if session.is_persistent() { "" } else { " (not saved)" }
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_start
}
