use glam::IVec3;

use crate::ui::link_dialog::{LinkForm, LinkKind};

/// One user action, as produced by a button, key or input signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    /// The Play/Resume button.
    PrimaryAction,
    /// The Save and Exit / Load Game button.
    SaveOrLoad,
    Exit,
    OpenFeatures,
    CloseFeatures,
    OpenSettings,
    /// Settings back button; applies the render distance.
    ApplySettings,
    RenderDistanceInput(String),
    FovInput(String),
    MusicInput(String),
    PointerLockChanged(bool),
    KeyDown(char),
    CanvasClick,
    PlaceLinkBlock(IVec3),
    LinkKindChanged(LinkKind),
    SubmitLink(LinkForm),
    CancelLink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Noop,
    Menu(MenuCommand),
    Status,
    Help,
    Quit,
    InvalidUsage(String),
    Unknown(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  play | save | exit          primary button, save/load button, exit button
  lock | unlock | click       pointer capture gained/lost, canvas click
  key <c>                     key press (e = menu, f = fullscreen)
  settings | apply            open settings, apply and close settings
  distance <n> | fov <n> | music <0|1>
  features | back             open/close the feature guide
  place <x> <y> <z>           place a link block (opens the link dialog)
  link <href> [target] | anchor <name> | cancel
  status | help | quit";

pub fn parse_command(line: &str) -> ConsoleInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ConsoleInput::Noop;
    }

    let input = trimmed.strip_prefix('/').unwrap_or(trimmed);
    if input.is_empty() {
        return ConsoleInput::Noop;
    }

    let mut head_tail = input.splitn(2, char::is_whitespace);
    let command = head_tail.next().unwrap_or_default().to_ascii_lowercase();
    let rest = head_tail.next().unwrap_or("").trim();

    let menu = |command: MenuCommand| ConsoleInput::Menu(command);
    match command.as_str() {
        "play" | "resume" => menu(MenuCommand::PrimaryAction),
        "save" | "load" => menu(MenuCommand::SaveOrLoad),
        "exit" => menu(MenuCommand::Exit),
        "lock" => menu(MenuCommand::PointerLockChanged(true)),
        "unlock" => menu(MenuCommand::PointerLockChanged(false)),
        "click" => menu(MenuCommand::CanvasClick),
        "settings" => menu(MenuCommand::OpenSettings),
        "apply" => menu(MenuCommand::ApplySettings),
        "features" => menu(MenuCommand::OpenFeatures),
        "back" => menu(MenuCommand::CloseFeatures),
        "cancel" => menu(MenuCommand::CancelLink),
        "key" => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(key), None) => menu(MenuCommand::KeyDown(key.to_ascii_lowercase())),
                _ => ConsoleInput::InvalidUsage("Usage: key <single character>".to_string()),
            }
        }
        "distance" => single_arg(rest, "Usage: distance <chunks>")
            .map(|value| menu(MenuCommand::RenderDistanceInput(value)))
            .unwrap_or_else(|usage| usage),
        "fov" => single_arg(rest, "Usage: fov <degrees>")
            .map(|value| menu(MenuCommand::FovInput(value)))
            .unwrap_or_else(|usage| usage),
        "music" => single_arg(rest, "Usage: music <0|1>")
            .map(|value| menu(MenuCommand::MusicInput(value)))
            .unwrap_or_else(|usage| usage),
        "place" => {
            let mut args = rest.split_whitespace();
            match (args.next(), args.next(), args.next(), args.next()) {
                (Some(x), Some(y), Some(z), None) => {
                    match (x.parse::<i32>(), y.parse::<i32>(), z.parse::<i32>()) {
                        (Ok(x), Ok(y), Ok(z)) => menu(MenuCommand::PlaceLinkBlock(IVec3::new(x, y, z))),
                        _ => ConsoleInput::InvalidUsage("Usage: place <x> <y> <z>".to_string()),
                    }
                }
                _ => ConsoleInput::InvalidUsage("Usage: place <x> <y> <z>".to_string()),
            }
        }
        "link" => {
            let mut args = rest.split_whitespace();
            match (args.next(), args.next(), args.next()) {
                (Some(href), target, None) => menu(MenuCommand::SubmitLink(LinkForm::link(
                    href,
                    target.unwrap_or_default(),
                ))),
                _ => ConsoleInput::InvalidUsage("Usage: link <href> [target]".to_string()),
            }
        }
        "anchor" => single_arg(rest, "Usage: anchor <name>")
            .map(|name| menu(MenuCommand::SubmitLink(LinkForm::anchor(name))))
            .unwrap_or_else(|usage| usage),
        "status" => ConsoleInput::Status,
        "help" => ConsoleInput::Help,
        "quit" | "stop" => ConsoleInput::Quit,
        _ => ConsoleInput::Unknown(input.to_string()),
    }
}

fn single_arg(rest: &str, usage: &str) -> Result<String, ConsoleInput> {
    let mut args = rest.split_whitespace();
    match (args.next(), args.next()) {
        (Some(value), None) => Ok(value.to_string()),
        _ => Err(ConsoleInput::InvalidUsage(usage.to_string())),
    }
}
