use rand::Rng;
use std::time::Duration;

use super::{MiniGameResult, Progress, count_down};
use crate::catalog::{OptionDefinition, PressBriefingTable, PressQuestion};
use crate::rng::chance;
use crate::stats::Effects;

pub const ANSWER_WINDOW: Duration = Duration::from_secs(5);
/// Pause between an answer landing and the next question.
pub const ANSWER_PAUSE: Duration = Duration::from_millis(800);
pub const HONESTY_DEATH_CHANCE: f64 = 0.5;

/// Three hostile questions, five seconds each. Silence counts as panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PressBriefing {
    questions: Vec<PressQuestion>,
    panic: OptionDefinition,
    completion: Effects,
    index: usize,
    remaining: Duration,
    pause: Option<Duration>,
    answers: Vec<String>,
    finished: bool,
}

impl PressBriefing {
    #[must_use]
    pub fn new(table: &PressBriefingTable) -> Self {
        Self {
            questions: table.questions.clone(),
            panic: table.panic.clone(),
            completion: table.completion,
            index: 0,
            remaining: ANSWER_WINDOW,
            pause: None,
            answers: Vec::new(),
            finished: false,
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&PressQuestion> {
        if self.finished {
            return None;
        }
        self.questions.get(self.index)
    }

    #[must_use]
    pub const fn question_index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Whether input is currently accepted.
    #[must_use]
    pub const fn accepting_answers(&self) -> bool {
        !self.finished && self.pause.is_none()
    }

    /// Ids of the answers given so far, panics included.
    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Pick answer `choice` for the current question. Honest answers roll
    /// `rng` for a fatal outbreak of integrity.
    pub fn answer<R: Rng + ?Sized>(&mut self, choice: usize, rng: &mut R) -> Progress {
        if !self.accepting_answers() {
            return Progress::Pending;
        }
        let Some(option) = self
            .questions
            .get(self.index)
            .and_then(|question| question.answers.get(choice))
            .cloned()
        else {
            return Progress::Pending;
        };
        self.submit(&option, rng)
    }

    fn submit<R: Rng + ?Sized>(&mut self, option: &OptionDefinition, rng: &mut R) -> Progress {
        self.answers.push(option.id.clone());
        if option.is_ethical && chance(rng, HONESTY_DEATH_CHANCE) {
            self.finished = true;
            log::info!("press briefing: honest answer {} was fatal", option.id);
            return Progress::Finished(MiniGameResult::died(option.effects));
        }
        self.pause = Some(ANSWER_PAUSE);
        Progress::Apply(option.effects)
    }

    pub fn tick(&mut self, dt: Duration) -> Progress {
        if self.finished {
            return Progress::Pending;
        }
        if let Some(pause) = self.pause.as_mut() {
            if !count_down(pause, dt) {
                return Progress::Pending;
            }
            self.pause = None;
            self.index += 1;
            if self.index >= self.questions.len() {
                self.finished = true;
                return Progress::Finished(MiniGameResult::survived(self.completion));
            }
            self.remaining = ANSWER_WINDOW;
            return Progress::Pending;
        }
        if !count_down(&mut self.remaining, dt) {
            return Progress::Pending;
        }
        // PANIC is never ethical, so no draw is needed.
        let panic = self.panic.clone();
        self.answers.push(panic.id.clone());
        self.pause = Some(ANSWER_PAUSE);
        Progress::Apply(panic.effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::catalog;
    use crate::minigames::MiniGameExit;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn briefing() -> PressBriefing {
        PressBriefing::new(&catalog().minigames.press_briefing)
    }

    #[test]
    fn answers_apply_immediately_and_advance_after_pause() {
        let mut game = briefing();
        let mut rng = SmallRng::seed_from_u64(1);
        let Progress::Apply(effects) = game.answer(1, &mut rng) else {
            panic!("answer should apply");
        };
        assert_eq!(effects.war_crimes, 2);
        assert!(!game.accepting_answers());
        assert_eq!(game.answer(0, &mut rng), Progress::Pending);
        assert_eq!(game.tick(ANSWER_PAUSE), Progress::Pending);
        assert_eq!(game.question_index(), 1);
        assert!(game.accepting_answers());
    }

    #[test]
    fn silence_is_recorded_as_panic() {
        let mut game = briefing();
        let Progress::Apply(effects) = game.tick(ANSWER_WINDOW) else {
            panic!("timeout should apply panic");
        };
        assert_eq!(effects.approval, -10);
        assert_eq!(effects.cholera_risk, 5);
        assert_eq!(game.answers(), ["PANIC".to_string()]);
    }

    #[test]
    fn three_spun_answers_complete_the_briefing() {
        let mut game = briefing();
        let mut rng = SmallRng::seed_from_u64(2);
        let mut finished = None;
        for _ in 0..3 {
            assert!(matches!(game.answer(0, &mut rng), Progress::Apply(_)));
            if let Progress::Finished(result) = game.tick(ANSWER_PAUSE) {
                finished = Some(result);
            }
        }
        let result = finished.expect("briefing should finish");
        assert_eq!(result.exit, MiniGameExit::Continue);
        assert_eq!(result.effects.approval, 10);
        assert!(game.current_question().is_none());
    }

    #[test]
    fn honesty_kills_about_half_the_time() {
        let mut rng = SmallRng::seed_from_u64(99);
        let trials = 2_000;
        let mut deaths = 0;
        for _ in 0..trials {
            let mut game = briefing();
            if game.answer(3, &mut rng).is_finished() {
                deaths += 1;
            }
        }
        let rate = f64::from(deaths) / f64::from(trials);
        assert!((0.45..=0.55).contains(&rate), "death rate {rate}");
    }
}
