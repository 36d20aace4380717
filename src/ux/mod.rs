use colored::Colorize;
use humansize::{format_size, DECIMAL};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;

use crate::client::{Loading, StudySession};
use crate::render::{ErrorPanel, Face, FlashcardDeck, Mark, QuestionGroup, QuizBoard, TextPanel, View};
use crate::state::{SessionState, StateStorage, CORRECT_ANSWER_XP};
use crate::wire::Mode;

/// Terminal spinner shown while a request is outstanding.
#[derive(Default)]
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Loading for Spinner {
    fn start(&mut self, mode: Mode) {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(format!("Generating {}...", mode.noun()));
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

pub fn print_dashboard(state: &SessionState) {
    println!(
        "\n{}",
        "┏━━━━━━━━━━━━━━━━━━━━━━━━ MindSpark ━━━━━━━━━━━━━━━━━━━━━━━━┓".bold()
    );
    println!(
        "  {}   {}: {}   {}: {}   {}: {}",
        state.level_title().magenta().bold(),
        "XP".yellow().bold(), state.xp,
        "Streak".red().bold(), state.streak,
        "Items".cyan().bold(), state.items_created
    );
    println!("{}", "┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".bold());
}

/// Compact one-liner used as the store's refresh callback.
pub fn print_status_line(state: &SessionState) {
    println!(
        "{} {} XP · {} · {} items",
        "★".yellow(),
        state.xp,
        state.level_title(),
        state.items_created
    );
}

pub fn print_source(path: &Path, text: &str) {
    println!(
        "Loaded {} ({} chars, {})",
        path.display().to_string().bold(),
        text.chars().count(),
        format_size(text.len() as u64, DECIMAL)
    );
}

pub fn print_view(view: &View) {
    match view {
        View::Text(panel) => print_text(panel),
        View::Flashcards(deck) => print_deck(deck),
        View::Quiz(board) => {
            for group in board.groups() {
                print_group(group);
            }
        }
        View::Error(panel) => print_error(panel),
    }
}

fn print_text(panel: &TextPanel) {
    println!("\n{}\n", panel.title.cyan().bold());
    println!("{}\n", panel.body);
}

fn print_error(panel: &ErrorPanel) {
    println!("\n{} {}", "⚠".red().bold(), panel.heading.red().bold());
    println!("{}", panel.message);
    println!("{}\n", panel.hint.dimmed());
}

fn print_deck(deck: &FlashcardDeck) {
    println!();
    for (i, card) in deck.cards().iter().enumerate() {
        let side = match card.face {
            Face::Front => "front".green(),
            Face::Back => "back".yellow(),
        };
        println!("[{}] ({}) {}", i + 1, side, card.shown());
    }
    println!();
}

fn print_group(group: &QuestionGroup) {
    println!("\n{}. {}", group.number, group.prompt.bold());
    for (i, opt) in group.options.iter().enumerate() {
        let letter = option_letter(i);
        let line = format!("  {letter}) {}", opt.label);
        let line = match opt.mark {
            Some(Mark::Correct) => format!("{}  ✔", line).green().bold(),
            Some(Mark::Wrong) => format!("{}  ✘", line).red().bold(),
            None if opt.disabled => line.dimmed(),
            None => line.normal(),
        };
        println!("{}", line);
    }
}

fn option_letter(i: usize) -> char {
    (b'A' + (i as u8 % 26)) as char
}

fn option_index(input: &str) -> Option<usize> {
    let c = input.trim().chars().next()?.to_ascii_uppercase();
    match c {
        'A'..='Z' => Some((c as u8 - b'A') as usize),
        '1'..='9' => Some((c as u8 - b'1') as usize),
        _ => None,
    }
}

/// Read one line from stdin. `None` on EOF or read error.
pub fn prompt(msg: &str) -> Option<String> {
    print!("{} ", msg);
    let _ = io::stdout().flush();
    let mut s = String::new();
    match io::stdin().lock().read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(s.trim().to_string()),
    }
}

/// Flip cards by number until the user enters nothing.
pub fn run_flashcards(deck: &mut FlashcardDeck) {
    print_deck(deck);
    loop {
        let Some(input) = prompt("Card to flip (enter to finish):") else { break };
        if input.is_empty() {
            break;
        }
        match input.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
            Some(i) => match deck.flip(i, |_| {}) {
                Some(text) => println!("[{}] {}", i + 1, text),
                None => println!("No card #{}", input),
            },
            None => println!("Enter a card number."),
        }
    }
}

fn answer_feedback(correct: bool) -> String {
    if correct {
        format!("Correct! +{CORRECT_ANSWER_XP} XP")
    } else {
        "Not quite.".to_string()
    }
}

/// Walk every unanswered question once; answers are final.
pub fn run_quiz<S: StateStorage>(session: &mut StudySession<S>, board: &mut QuizBoard) {
    let total = board.groups().len();
    for q in 0..total {
        print_group(&board.groups()[q]);
        loop {
            let Some(input) = prompt("Your answer:") else { return };
            let Some(opt) = option_index(&input) else {
                println!("Pick one of A-D.");
                continue;
            };
            match session.answer(board, q, opt) {
                Some(answer) => {
                    print_group(&board.groups()[q]);
                    let feedback = answer_feedback(answer.correct);
                    if answer.correct {
                        println!("{}", feedback.green().bold());
                    } else {
                        println!("{}", feedback.red());
                    }
                    break;
                }
                None => println!("Pick one of A-D."),
            }
        }
    }
}
