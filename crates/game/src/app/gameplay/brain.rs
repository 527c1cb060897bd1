use rand::Rng;

use super::quotes::QuoteComposer;

const NORTH_KEYWORDS: &[&str] = &["north", "up"];
const ROOT_KEYWORDS: &[&str] = &["tree", "root", "trees", "roots", "plants", "plant"];
const ACCEPT_KEYWORDS: &[&str] = &["ok", "okay", "yes", "sure", "i will", "accept"];

pub(crate) const CLOSING_LINE: &str = "Let´s see what it remembers.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum DancerState {
    #[default]
    Intro,
    HintNorth,
    HintRoot,
    Request,
    Accepted,
    Complete,
}

/// One-way quest line: point the player north, toward the root, then ask for it.
#[derive(Debug, Clone, Default)]
pub(crate) struct DancerBrain {
    state: DancerState,
}

impl DancerBrain {
    #[cfg(test)]
    pub(crate) fn state(&self) -> DancerState {
        self.state
    }

    /// Conversation-start hook. The brain keeps its state between conversations.
    pub(crate) fn start(&mut self) {}

    pub(crate) fn respond<R: Rng + ?Sized>(
        &mut self,
        input: &str,
        composer: &QuoteComposer,
        rng: &mut R,
    ) -> String {
        let text = input.to_lowercase();

        match self.state {
            DancerState::Intro => {
                self.state = DancerState::HintNorth;
                format!(
                    "This world is a real mess. {}",
                    composer.composed_quote(2, rng)
                )
            }
            DancerState::HintNorth => {
                if contains_any(&text, NORTH_KEYWORDS) {
                    self.state = DancerState::HintRoot;
                    format!("You may as well look north. {}", composer.random_quote(rng))
                } else {
                    format!("Directions matter. {}", composer.composed_quote(2, rng))
                }
            }
            DancerState::HintRoot => {
                if contains_any(&text, ROOT_KEYWORDS) {
                    self.state = DancerState::Request;
                    format!(
                        "It will look like someone walked. A root. {}",
                        composer.composed_quote(2, rng)
                    )
                } else {
                    format!(
                        "Look for signs in the ground. {}",
                        composer.random_quote(rng)
                    )
                }
            }
            DancerState::Request => {
                if contains_any(&text, ACCEPT_KEYWORDS) {
                    self.state = DancerState::Accepted;
                    format!("It's beautiful. {}", composer.composed_quote(2, rng))
                } else {
                    format!(
                        "You've certainly changed. I haven't. go north, take the root. {}",
                        composer.random_quote(rng)
                    )
                }
            }
            DancerState::Accepted => {
                self.state = DancerState::Complete;
                format!(
                    "Just one way, in and back out. {}",
                    composer.composed_quote(2, rng)
                )
            }
            DancerState::Complete => CLOSING_LINE.to_string(),
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
