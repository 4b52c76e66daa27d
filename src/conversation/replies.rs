//! Fixed reply texts.

use rand::seq::SliceRandom;

pub const GREETING: &str = "I'm a bot, please talk to me!";
pub const ASK_QUESTION: &str = "To what question should I answer?";
pub const ASK_ANSWER: &str = "Then what should I say?";
pub const ASK_FORGET: &str = "What should I forget?";
pub const INVALID_PATTERN: &str = "Invalid Regex!";
pub const CANCELED: &str = "Canceled.";
pub const UNKNOWN: &str = "What?";
pub const DESYNC: &str = "I don't remember well.";
pub const BROKEN_TEMPLATE: &str = "I learned that one wrong.";
pub const FORGOTTEN: &str = "Forgotten.";
pub const NOT_FOUND: &str = "Not found.";
pub const STORE_FAILURE: &str = "Something went wrong, please try again.";
pub const NO_KEYS: &str = "I haven't learned anything yet.";
pub const NO_ACTIVITY: &str = "No activity recorded.";

pub const ACKNOWLEDGEMENTS: [&str; 3] = ["OK", "I got it!", "I learned it."];

/// One of [`ACKNOWLEDGEMENTS`], picked at random.
pub fn acknowledgement() -> &'static str {
    ACKNOWLEDGEMENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(ACKNOWLEDGEMENTS[0])
}
