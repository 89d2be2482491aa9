//! Keyboard jog: one key press, one short move.

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::os::fd::AsFd;

use anyhow::{Context, Result};
use armdroid::{ArmCommand, ArmController, Clock, Direction, Joint, OutputPort};
use nix::sys::termios::{self, OutputFlags, SetArg, Termios};

pub const EXIT_KEY: char = 'v';
const CTRL_C: u8 = 0x03;

/// Key pairs per joint: first key direction 0, second key direction 1.
const JOG_KEYS: [(char, char, Joint); 6] = [
    ('q', 'w', Joint::Base),
    ('a', 's', Joint::Shoulder),
    ('z', 'x', Joint::UpperArm),
    ('o', 'p', Joint::WristPitch),
    ('k', 'l', Joint::WristRoll),
    ('n', 'm', Joint::Gripper),
];

/// Default keymap with `steps` per press, then the configured overrides.
pub fn keymap(
    steps: i32,
    overrides: Option<&BTreeMap<String, ArmCommand>>,
) -> BTreeMap<char, ArmCommand> {
    let mut map = BTreeMap::new();
    for (back, fwd, joint) in JOG_KEYS {
        let joint = joint.index() as u8;
        map.insert(back, ArmCommand::Drive { joint, steps, direction: Direction::Backward });
        map.insert(fwd, ArmCommand::Drive { joint, steps, direction: Direction::Forward });
    }
    map.insert('r', ArmCommand::SetEnergized { on: false });
    map.insert('h', ArmCommand::SetEnergized { on: true });

    for (key, cmd) in overrides.into_iter().flatten() {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c != EXIT_KEY => {
                map.insert(c, cmd.clone());
            }
            _ => tracing::warn!("Ignoring key binding {:?}: not a single non-exit key", key),
        }
    }
    map
}

pub fn print_help(map: &BTreeMap<char, ArmCommand>) {
    println!("Keys:");
    for line in help_lines(map) {
        println!("  {}", line);
    }
}

/// One line per bound key, describing what the key does now.
fn help_lines(map: &BTreeMap<char, ArmCommand>) -> Vec<String> {
    let mut lines = vec![format!("{}: exit", EXIT_KEY.to_ascii_uppercase())];
    lines.extend(
        map.iter()
            .map(|(key, cmd)| format!("{}: {}", key.to_ascii_uppercase(), describe(cmd))),
    );
    lines
}

fn describe(cmd: &ArmCommand) -> String {
    match cmd {
        ArmCommand::Drive { joint, steps, direction } => {
            let name = Joint::from_index(*joint as usize).map_or("unknown joint", Joint::name);
            format!("{} {} steps {:?}", name, steps, direction)
        }
        ArmCommand::DriveMulti { joints, steps } => {
            format!("joints {:?} by {:?}", joints.as_slice(), steps.as_slice())
        }
        ArmCommand::SetEnergized { on: true } => "hold".to_string(),
        ArmCommand::SetEnergized { on: false } => "release".to_string(),
    }
}

/// Puts the terminal in raw mode for the lifetime of the guard.
struct RawTerminal {
    saved: Termios,
}

impl RawTerminal {
    fn enter() -> Result<Self> {
        let stdin = io::stdin();
        let saved = termios::tcgetattr(stdin.as_fd()).context("stdin is not a terminal")?;
        let mut raw = saved.clone();
        termios::cfmakeraw(&mut raw);
        // Keep newline translation so log lines still start at column 0.
        raw.output_flags |= OutputFlags::OPOST | OutputFlags::ONLCR;
        termios::tcsetattr(stdin.as_fd(), SetArg::TCSADRAIN, &raw)
            .context("Failed to enter raw mode")?;
        Ok(Self { saved })
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = termios::tcsetattr(io::stdin().as_fd(), SetArg::TCSADRAIN, &self.saved);
    }
}

/// Read keys until the exit key and run the bound command for each.
pub fn run<P: OutputPort, C: Clock>(
    arm: &mut ArmController<P, C>,
    map: &BTreeMap<char, ArmCommand>,
) -> Result<()> {
    let _raw = RawTerminal::enter()?;
    let mut stdin = io::stdin().lock();
    let mut key = [0u8; 1];
    loop {
        if stdin.read(&mut key).context("Failed to read key")? == 0 || key[0] == CTRL_C {
            break;
        }
        let c = (key[0] as char).to_ascii_lowercase();
        if c == EXIT_KEY {
            break;
        }
        if let Some(cmd) = map.get(&c) {
            // Rejections are logged by the controller; keep jogging.
            let _ = arm.handle_command(cmd);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keys_follow_joint_pairs() {
        let map = keymap(5, None);
        assert_eq!(
            map[&'q'],
            ArmCommand::Drive { joint: 5, steps: 5, direction: Direction::Backward }
        );
        assert_eq!(
            map[&'m'],
            ArmCommand::Drive { joint: 0, steps: 5, direction: Direction::Forward }
        );
        assert_eq!(map[&'r'], ArmCommand::SetEnergized { on: false });
        assert!(!map.contains_key(&EXIT_KEY));
        assert_eq!(map.len(), 14);
    }

    #[test]
    fn overrides_replace_and_extend() {
        let mut extra = BTreeMap::new();
        extra.insert("q".to_string(), ArmCommand::SetEnergized { on: true });
        extra.insert("g".to_string(), ArmCommand::SetEnergized { on: false });
        extra.insert("v".to_string(), ArmCommand::SetEnergized { on: false });
        extra.insert("too-long".to_string(), ArmCommand::SetEnergized { on: false });

        let map = keymap(5, Some(&extra));
        assert_eq!(map[&'q'], ArmCommand::SetEnergized { on: true });
        assert_eq!(map[&'g'], ArmCommand::SetEnergized { on: false });
        assert!(!map.contains_key(&'v'));
        assert_eq!(map.len(), 15);
    }

    #[test]
    fn help_shows_rebound_keys() {
        let mut extra = BTreeMap::new();
        extra.insert("q".to_string(), ArmCommand::SetEnergized { on: false });
        let lines = help_lines(&keymap(20, Some(&extra)));

        assert!(lines.contains(&"Q: release".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("Q: base")));
        assert!(lines.contains(&"W: base 20 steps Forward".to_string()));
        assert!(lines.contains(&"V: exit".to_string()));
        assert_eq!(lines.len(), 15);
    }
}
