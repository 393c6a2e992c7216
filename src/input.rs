// External inputs: the line protocol spoken by the sensor link, a reader that
// turns any line stream into queued commands, and keyboard-to-text mapping.
//
// One command per line:
//
// | line          | command                              |
// |---------------|--------------------------------------|
// | `1234`        | sensor reading                       |
// | `NEXT`        | advance to the next mask             |
// | `PLANT`       | submit the draft (or a seed line)    |
// | `TEXT:<line>` | submit `<line>`                      |
// | `PAUSE`       | toggle pause                         |
//
// Anything else is dropped.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use log::{debug, warn};
use minifb::Key;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Sensor(f32),
    NextMask,
    Plant,
    Text(String),
    TogglePause,
}

pub fn parse_line(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Ok(n) = line.parse::<f32>() {
        return n.is_finite().then_some(Command::Sensor(n));
    }
    match line {
        "NEXT" => Some(Command::NextMask),
        "PLANT" => Some(Command::Plant),
        "PAUSE" => Some(Command::TogglePause),
        _ => {
            let text = line.strip_prefix("TEXT:")?.trim();
            (!text.is_empty()).then(|| Command::Text(text.to_string()))
        }
    }
}

/// Read lines on a background thread; parsed commands arrive on the returned channel.
/// The thread ends when the stream ends, errors, or the receiver is dropped.
pub fn spawn_line_reader<R>(reader: R) -> Receiver<Command>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!("input stream read error: {e}");
                    break;
                }
            };
            match parse_line(&line) {
                Some(cmd) => {
                    if tx.send(cmd).is_err() {
                        break;
                    }
                }
                None => debug!("ignoring input line {line:?}"),
            }
        }
    });
    rx
}

/// Printable character for a key, honouring shift. `None` for non-text keys.
#[rustfmt::skip]
pub fn key_to_char(key: Key, shift: bool) -> Option<char> {
    let letter = |c: char| Some(if shift { c.to_ascii_uppercase() } else { c });
    let pair = |plain: char, shifted: char| Some(if shift { shifted } else { plain });
    match key {
        Key::A => letter('a'), Key::B => letter('b'), Key::C => letter('c'), Key::D => letter('d'),
        Key::E => letter('e'), Key::F => letter('f'), Key::G => letter('g'), Key::H => letter('h'),
        Key::I => letter('i'), Key::J => letter('j'), Key::K => letter('k'), Key::L => letter('l'),
        Key::M => letter('m'), Key::N => letter('n'), Key::O => letter('o'), Key::P => letter('p'),
        Key::Q => letter('q'), Key::R => letter('r'), Key::S => letter('s'), Key::T => letter('t'),
        Key::U => letter('u'), Key::V => letter('v'), Key::W => letter('w'), Key::X => letter('x'),
        Key::Y => letter('y'), Key::Z => letter('z'),
        Key::Key0 => pair('0', ')'), Key::Key1 => pair('1', '!'), Key::Key2 => pair('2', '@'),
        Key::Key3 => pair('3', '#'), Key::Key4 => pair('4', '$'), Key::Key5 => pair('5', '%'),
        Key::Key6 => pair('6', '^'), Key::Key7 => pair('7', '&'), Key::Key8 => pair('8', '*'),
        Key::Key9 => pair('9', '('),
        Key::Space => Some(' '),
        Key::Period => pair('.', '>'),
        Key::Comma => pair(',', '<'),
        Key::Apostrophe => pair('\'', '"'),
        Key::Semicolon => pair(';', ':'),
        Key::Slash => pair('/', '?'),
        Key::Minus => pair('-', '_'),
        Key::Equal => pair('=', '+'),
        _ => None,
    }
}
