use std::io::IsTerminal;

use clap::{
  ValueEnum,
  builder::styling::{Color as ClapColor, RgbColor, Style, Styles},
};
use comfy_table::Color as ComfyColor;
use crossterm::style::Color;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
  Always,
  Auto,
  Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeMode {
  Dark,
  Light,
  Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
  Dark,
  Light,
}

/// What a piece of output is, independent of how it is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  Timestamp,
  Primary,
  Accent,
  Info,
  Success,
  Label,
  Value,
}

type Rgb = (u8, u8, u8);

impl Role {
  const fn rgb(self, theme: Theme) -> Rgb {
    let (dark, light) = match self {
      Role::Timestamp => ((118, 166, 166), (92, 62, 38)),
      Role::Primary => ((191, 126, 4), (70, 42, 25)),
      Role::Accent => ((166, 84, 55), (211, 99, 70)),
      Role::Info => ((118, 166, 166), (40, 111, 170)),
      Role::Success => ((118, 166, 166), (34, 142, 90)),
      Role::Label => ((217, 164, 4), (176, 103, 66)),
      Role::Value => ((242, 211, 56), (199, 146, 76)),
    };
    match theme {
      Theme::Dark => dark,
      Theme::Light => light,
    }
  }
}

pub struct Colors {
  enabled: bool,
  theme: Theme,
}

impl Colors {
  pub const fn new(enabled: bool, theme: Theme) -> Self {
    Self { enabled, theme }
  }

  const fn rgb(&self, role: Role) -> Option<Rgb> {
    if self.enabled { Some(role.rgb(self.theme)) } else { None }
  }

  /// Terminal color for `role`, `Reset` when colors are off.
  pub const fn paint(&self, role: Role) -> Color {
    match self.rgb(role) {
      Some((r, g, b)) => Color::Rgb { r, g, b },
      None => Color::Reset,
    }
  }

  /// Table cell color for `role`.
  pub const fn cell(&self, role: Role) -> ComfyColor {
    match self.rgb(role) {
      Some((r, g, b)) => ComfyColor::Rgb { r, g, b },
      None => ComfyColor::Reset,
    }
  }

  pub const fn timestamp(&self) -> Color {
    self.paint(Role::Timestamp)
  }

  pub const fn primary(&self) -> Color {
    self.paint(Role::Primary)
  }

  pub const fn accent(&self) -> Color {
    self.paint(Role::Accent)
  }

  pub const fn info(&self) -> Color {
    self.paint(Role::Info)
  }

  pub const fn success(&self) -> Color {
    self.paint(Role::Success)
  }

  pub const fn label(&self) -> Color {
    self.paint(Role::Label)
  }

  pub const fn value(&self) -> Color {
    self.paint(Role::Value)
  }

  /// Help output always uses the dark palette; clap decides on its own whether to color it.
  pub const fn clap_styles() -> Styles {
    const fn fg(role: Role) -> Option<ClapColor> {
      let (r, g, b) = role.rgb(Theme::Dark);
      Some(ClapColor::Rgb(RgbColor(r, g, b)))
    }

    Styles::styled()
      .header(Style::new().bold().underline().fg_color(fg(Role::Label)))
      .usage(Style::new().bold().fg_color(fg(Role::Label)))
      .literal(Style::new().fg_color(fg(Role::Success)))
      .placeholder(Style::new().fg_color(fg(Role::Info)))
      .error(Style::new().bold().fg_color(fg(Role::Accent)))
      .valid(Style::new().fg_color(fg(Role::Success)))
      .invalid(Style::new().bold().fg_color(fg(Role::Accent)))
  }
}

pub fn colors_enabled(mode: ColorMode) -> bool {
  match mode {
    ColorMode::Always => true,
    ColorMode::Never => false,
    // Generated code on stdout must stay free of escape codes.
    ColorMode::Auto => std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
  }
}

pub fn detect_theme(mode: ThemeMode) -> Theme {
  match mode {
    ThemeMode::Dark => Theme::Dark,
    ThemeMode::Light => Theme::Light,
    ThemeMode::Auto => detect_terminal_theme(),
  }
}

fn detect_terminal_theme() -> Theme {
  if let Ok(colorfgbg) = std::env::var("COLORFGBG")
    && let Some(theme) = theme_from_colorfgbg(&colorfgbg)
  {
    return theme;
  }

  if std::env::var("ITERM_PROFILE").is_ok_and(|profile| profile.to_lowercase().contains("light")) {
    return Theme::Light;
  }

  Theme::Dark
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`). Background palette indices 8 and up are light.
fn theme_from_colorfgbg(value: &str) -> Option<Theme> {
  let background = value.split(';').next_back()?.parse::<u8>().ok()?;
  Some(if background >= 8 { Theme::Light } else { Theme::Dark })
}
