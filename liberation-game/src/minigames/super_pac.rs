use super::{MiniGameResult, Progress};
use crate::catalog::{ShellCompany, SuperPacTable};
use crate::stats::Effects;

/// Millions to launder before the game pays out.
pub const FUNDS_TARGET: u32 = 5;
const TRANCHE: u32 = 1;
const SUSPICION_LIMIT: i32 = 100;

/// Route campaign money through shell companies without tripping the FEC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperPac {
    shells: Vec<ShellCompany>,
    routed: u32,
    suspicion: i32,
    finished: bool,
}

impl SuperPac {
    #[must_use]
    pub fn new(table: &SuperPacTable) -> Self {
        Self {
            shells: table.shells.clone(),
            routed: 0,
            suspicion: 0,
            finished: false,
        }
    }

    #[must_use]
    pub fn shells(&self) -> &[ShellCompany] {
        &self.shells
    }

    /// Millions routed so far.
    #[must_use]
    pub const fn routed(&self) -> u32 {
        self.routed
    }

    #[must_use]
    pub const fn suspicion(&self) -> i32 {
        self.suspicion
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Push one tranche through the shell at `index`. Returns `None` when the
    /// game is over or no shell sits at `index`.
    pub fn route(&mut self, index: usize) -> Option<Progress> {
        if self.finished {
            return None;
        }
        let shell = self.shells.get(index)?;
        self.routed += TRANCHE;
        self.suspicion = self.suspicion.saturating_add(shell.trace);

        let result = if shell.is_ethical {
            MiniGameResult::died(Effects {
                cholera_risk: 40,
                ..Effects::default()
            })
        } else if self.suspicion >= SUSPICION_LIMIT {
            MiniGameResult::survived(Effects {
                approval: -20,
                treasury: -10,
                ..Effects::default()
            })
        } else if self.routed >= FUNDS_TARGET {
            MiniGameResult::survived(Effects {
                treasury: 5,
                approval: 5,
                ..Effects::default()
            })
        } else {
            return Some(Progress::Pending);
        };
        self.finished = true;
        log::debug!(
            "super PAC closed via {} at ${}M, suspicion {}",
            shell.id,
            self.routed,
            self.suspicion
        );
        Some(Progress::Finished(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::catalog;
    use crate::minigames::MiniGameExit;

    fn game() -> SuperPac {
        SuperPac::new(&catalog().minigames.super_pac)
    }

    #[test]
    fn opaque_shells_launder_five_million() {
        let mut game = game();
        for _ in 0..4 {
            assert_eq!(game.route(0), Some(Progress::Pending));
        }
        let Some(Progress::Finished(result)) = game.route(0) else {
            panic!("fifth tranche should close the game");
        };
        assert_eq!(result.effects.treasury, 5);
        assert_eq!(result.exit, MiniGameExit::Continue);
        assert_eq!(game.route(0), None);
    }

    #[test]
    fn traceable_shells_trigger_an_investigation() {
        let mut game = game();
        for _ in 0..3 {
            game.route(2);
        }
        assert_eq!(game.suspicion(), 75);
        let Some(Progress::Finished(result)) = game.route(2) else {
            panic!("fourth traceable tranche should trip the FEC");
        };
        assert_eq!(result.effects.approval, -20);
        assert_eq!(result.effects.treasury, -10);
    }

    #[test]
    fn transparency_is_fatal() {
        let mut game = game();
        let Some(Progress::Finished(result)) = game.route(3) else {
            panic!("direct donation should end the game");
        };
        assert_eq!(result.exit, MiniGameExit::Death);
        assert_eq!(result.effects.cholera_risk, 40);
    }

    #[test]
    fn unknown_shell_is_ignored() {
        let mut game = game();
        assert_eq!(game.route(9), None);
        assert_eq!(game.routed(), 0);
        assert_eq!(game.suspicion(), 0);
    }
}
