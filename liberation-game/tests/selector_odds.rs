use liberation_game::config::SelectorOdds;
use liberation_game::selector::{ethical_death_roll, next_screen};
use liberation_game::{
    ChoiceOrigin, ChoiceRequest, Effects, GameState, OptionDefinition, Resolution, RngBundle,
    Screen, StatKey, resolve_choice,
};
use std::convert::TryFrom;

const SAMPLE_SIZE: usize = 10_000;
const TOLERANCE: f64 = 0.02;

fn rate(hits: usize) -> f64 {
    let hits = u32::try_from(hits).expect("count fits");
    let total = u32::try_from(SAMPLE_SIZE).expect("sample size fits u32");
    f64::from(hits) / f64::from(total)
}

#[test]
fn zero_risk_never_kills() {
    let mut rngs = RngBundle::from_user_seed(1);
    assert!((0..SAMPLE_SIZE).all(|_| !ethical_death_roll(0, &mut rngs)));
    assert!((0..SAMPLE_SIZE).all(|_| !ethical_death_roll(-15, &mut rngs)));
    assert_eq!(rngs.total_draws(), 0, "certain outcomes must not draw");
}

#[test]
fn saturated_risk_always_kills() {
    let mut rngs = RngBundle::from_user_seed(2);
    for risk in [100, 125, i32::MAX] {
        assert!(ethical_death_roll(risk, &mut rngs), "risk {risk}");
    }
}

#[test]
fn death_rate_tracks_risk() {
    let mut rngs = RngBundle::from_user_seed(3);
    for risk in [10, 25, 50, 90] {
        let deaths = (0..SAMPLE_SIZE)
            .filter(|_| ethical_death_roll(risk, &mut rngs))
            .count();
        let expected = f64::from(risk) / 100.0;
        let observed = rate(deaths);
        assert!(
            (observed - expected).abs() <= TOLERANCE,
            "risk {risk}: observed {observed:.4}"
        );
    }
}

#[test]
fn calm_world_screen_mix() {
    let odds = SelectorOdds::default();
    let mut rngs = RngBundle::from_user_seed(4);
    let mut random_events = 0;
    let mut mini_games = 0;
    let mut events = 0;
    for _ in 0..SAMPLE_SIZE {
        match next_screen(None, 0, &mut rngs, &odds) {
            Screen::RandomEvent => random_events += 1,
            Screen::Event => events += 1,
            screen if screen.is_mini_game() => mini_games += 1,
            other => panic!("unexpected follow-up {other}"),
        }
    }
    assert!((rate(random_events) - 0.10).abs() <= TOLERANCE);
    assert!((rate(mini_games) - 0.30).abs() <= TOLERANCE);
    assert!((rate(events) - 0.60).abs() <= TOLERANCE);
}

#[test]
fn chaos_crowds_out_mini_games() {
    let odds = SelectorOdds::default();
    let mut rngs = RngBundle::from_user_seed(5);
    let mut random_events = 0;
    for _ in 0..SAMPLE_SIZE {
        let screen = next_screen(None, 100, &mut rngs, &odds);
        assert!(!screen.is_mini_game(), "threshold above the ceiling leaves no mini-game band");
        if screen == Screen::RandomEvent {
            random_events += 1;
        }
    }
    assert!((rate(random_events) - 0.60).abs() <= TOLERANCE);
}

#[test]
fn linked_mini_game_is_taken_without_a_roll() {
    let odds = SelectorOdds::default();
    let mut rngs = RngBundle::from_user_seed(6);
    for _ in 0..100 {
        assert_eq!(
            next_screen(Some(Screen::DroneStrike), 100, &mut rngs, &odds),
            Screen::DroneStrike
        );
    }
    assert_eq!(rngs.total_draws(), 0);
}

#[test]
fn chaos_past_one_hundred_keeps_raising_interstitial_odds() {
    let odds = SelectorOdds::default();
    let mut state = GameState::default();
    state.stats.chaos = 100;
    let pick = OptionDefinition {
        id: "ESCALATE".to_string(),
        label: "Escalate".to_string(),
        description: String::new(),
        effects: Effects::default()
            .with(StatKey::Chaos, 40)
            .with(StatKey::Approval, 1),
        is_ethical: false,
        mini_game: None,
    };
    let request = ChoiceRequest {
        state: &state,
        title: "ESCALATION",
        option: &pick,
        origin: ChoiceOrigin::Event,
    };
    let mut rngs = RngBundle::from_user_seed(7);
    let mut random_events = 0;
    for _ in 0..SAMPLE_SIZE {
        match resolve_choice(&request, &mut rngs, &odds).resolution {
            Resolution::Navigate(Screen::RandomEvent) => random_events += 1,
            Resolution::Navigate(Screen::Event) => {}
            other => panic!("unexpected resolution {other:?}"),
        }
    }
    // Threshold 10 + 140 * 0.5 = 80.
    assert!(
        (rate(random_events) - 0.80).abs() <= TOLERANCE,
        "observed {:.4}",
        rate(random_events)
    );
}

#[test]
fn negative_chaos_floors_at_the_base_rate() {
    let odds = SelectorOdds::default();
    let mut state = GameState::default();
    state.stats.chaos = 0;
    let pick = OptionDefinition {
        id: "CALM".to_string(),
        label: "Calm".to_string(),
        description: String::new(),
        effects: Effects::default()
            .with(StatKey::Chaos, -30)
            .with(StatKey::Approval, 1),
        is_ethical: false,
        mini_game: None,
    };
    let request = ChoiceRequest {
        state: &state,
        title: "CALM",
        option: &pick,
        origin: ChoiceOrigin::Event,
    };
    let mut rngs = RngBundle::from_user_seed(8);
    let random_events = (0..SAMPLE_SIZE)
        .filter(|_| {
            resolve_choice(&request, &mut rngs, &odds).resolution
                == Resolution::Navigate(Screen::RandomEvent)
        })
        .count();
    assert!((rate(random_events) - 0.10).abs() <= TOLERANCE);
}
