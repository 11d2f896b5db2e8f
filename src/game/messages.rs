//! Broadcast and Whisper Text
//!
//! Plain-text builders for everything the round says. Rich-text markup is the
//! chat collaborator's business; only counts, names and times are substituted here.

use crate::core::time::time_format;
use crate::game::leaderboard::Standing;

/// `"1 egg"`, `"2 eggs"`.
pub fn eggs(count: usize) -> String {
    format!("{} egg{}", count, if count == 1 { "" } else { "s" })
}

/// Singular/plural noun pair used inside counted flavor lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Noun {
    singular: &'static str,
    plural: &'static str,
}

const fn noun(singular: &'static str, plural: &'static str) -> Option<Noun> {
    Some(Noun { singular, plural })
}

/// A flavor line shown to a player after each find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindMessage {
    /// Fixed line; the player's running total is appended.
    Plain(&'static str),
    /// Line with the running total inline, optionally followed by a noun
    /// that agrees with it.
    Counted {
        /// Text before the count.
        prefix: &'static str,
        /// Noun after the count.
        noun: Option<Noun>,
        /// Text after the count (and noun).
        suffix: &'static str,
    },
}

impl FindMessage {
    /// Render for a player whose total is now `count`.
    pub fn render(&self, count: u32) -> String {
        match self {
            FindMessage::Plain(text) => {
                format!("{} You've found {}.", text, eggs(count as usize))
            }
            FindMessage::Counted { prefix, noun, suffix } => {
                let noun = match noun {
                    Some(n) if count == 1 => n.singular,
                    Some(n) => n.plural,
                    None => "",
                };
                format!("{}{}{}{}", prefix, count, noun, suffix)
            }
        }
    }
}

const fn counted(prefix: &'static str, noun: Option<Noun>, suffix: &'static str) -> FindMessage {
    FindMessage::Counted { prefix, noun, suffix }
}

/// Flavor lines for ordinary finds.
pub const FIND_MESSAGES: &[FindMessage] = &[
    counted("An egg! You've got ", noun(" egg", " eggs"), "!"),
    counted("Another one! ", None, " is a lot!"),
    FindMessage::Plain("Ooh, a piece of candy!"),
    counted("EGG. ", noun(" EGG", " EGGS"), "."),
    counted("You've colleggted ", noun(" egg", " eggs"), "."),
    FindMessage::Plain("Fantastegg!"),
    FindMessage::Plain("Speggtacular!"),
    FindMessage::Plain("Scrambled!"),
    FindMessage::Plain("Another one in the basket!"),
    FindMessage::Plain("Another one bites the dust!"),
    FindMessage::Plain("Eggcelent!"),
    FindMessage::Plain("Eggstravagant!"),
    FindMessage::Plain("Go get 'em champ!"),
    FindMessage::Plain("GET IN THERE SOLDIER!!!"),
    counted("a5 tomorrow? a", None, "? tomorrow?"),
    FindMessage::Plain("POACHED."),
    FindMessage::Plain("Over easy??!"),
    FindMessage::Plain("Sunny. Side. Up."),
    FindMessage::Plain("That one was spoiled..."),
    FindMessage::Plain("BOILED!"),
    FindMessage::Plain("Yolks!!!"),
    FindMessage::Plain("THAT ONE WAS A LITTLE BIG!"),
    FindMessage::Plain("Ostrich flavored."),
    FindMessage::Plain("That one stunk..."),
    FindMessage::Plain("Hop to it!"),
    FindMessage::Plain("That's a lotta damage!"),
    counted("Don't you think ", noun(" egg", " eggs"), " is too many?"),
    counted("", noun(" e g g", " e g g s"), ""),
    counted("you've been in a coma for ", noun(" year", " years"), ". wake up."),
    counted("1... 2... ", None, "!"),
    counted("", None, " down, more to go!"),
    counted("Holy cow, ", noun(" egg", " eggs"), "?!"),
    counted("How can u fit ", noun(" egg", " eggs"), " in ur pockets???"),
];

/// Line shown to whoever finds the bonus object.
pub const BONUS_FIND_MESSAGE: FindMessage = FindMessage::Plain("The golden egg!");

/// Round start announcement.
pub fn round_started(placed: usize) -> String {
    format!("Egg hunt! {} have been placed. Whoever finds the most wins!", eggs(placed))
}

/// Broadcast when the bonus object is found.
pub fn bonus_found(player_name: &str) -> String {
    format!("{} found the golden egg!", player_name)
}

/// Status tick broadcast.
pub fn status(remaining: usize, remaining_ms: i64) -> String {
    format!(
        "{} remain{}! {} left.",
        eggs(remaining),
        if remaining == 1 { "s" } else { "" },
        time_format(remaining_ms),
    )
}

/// Leaderboard header for a round where everything was found.
pub fn all_found_header(elapsed_ms: i64) -> String {
    format!("All eggs have been found in {}! Results:", time_format(elapsed_ms))
}

/// Leaderboard header for a round that hit its deadline.
pub const TIME_UP_HEADER: &str = "Time's up! Results:";

/// Leaderboard header for a round stopped by command.
pub const STOPPED_HEADER: &str = "The egg hunt was stopped. Results:";

/// One leaderboard line.
pub fn standing_line(standing: &Standing, name: &str) -> String {
    format!(
        "{}) {}{}, {}",
        standing.rank,
        name,
        if standing.bonus_finder { " (golden egg)" } else { "" },
        eggs(standing.count as usize),
    )
}
