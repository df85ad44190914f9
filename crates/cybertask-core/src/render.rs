use std::io::{self, IsTerminal, Write};

use chrono::Local;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::game::{BossStage, Progress, damage_per_task, next_trophy, trophies};
use crate::task::Task;
use crate::theme::{MoodTheme, themes};

const SHORT_ID_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    accent: Option<(u8, u8, u8)>,
}

impl Renderer {
    pub fn new(cfg: &Config, theme: &MoodTheme) -> Self {
        let color = cfg.get_bool("color").unwrap_or(true) && io::stdout().is_terminal();
        Self {
            color,
            accent: parse_hex_color(theme.accent),
        }
    }

    pub fn plain() -> Self {
        Self {
            color: false,
            accent: None,
        }
    }

    #[tracing::instrument(skip(self, out, tasks))]
    pub fn write_task_table<W: Write>(&self, out: &mut W, tasks: &[&Task]) -> anyhow::Result<()> {
        if tasks.is_empty() {
            writeln!(out, "No tasks.")?;
            return Ok(());
        }

        let headers = vec![
            "ID".to_string(),
            "Done".to_string(),
            "Added".to_string(),
            "Name".to_string(),
            "Description".to_string(),
        ];

        let rows = tasks
            .iter()
            .map(|task| {
                let id: String = task.id.as_str().chars().take(SHORT_ID_LEN).collect();
                let done = if task.completed { "x" } else { " " };
                vec![
                    self.paint(&id),
                    done.to_string(),
                    task.created_at
                        .with_timezone(&Local)
                        .format("%Y-%m-%d")
                        .to_string(),
                    task.name.clone(),
                    task.description.clone(),
                ]
            })
            .collect();

        write_table(out, headers, rows)
    }

    pub fn write_themes<W: Write>(&self, out: &mut W, current: &str) -> anyhow::Result<()> {
        let headers = vec![
            " ".to_string(),
            "Key".to_string(),
            "Name".to_string(),
            "Description".to_string(),
        ];
        let rows = themes()
            .iter()
            .map(|theme| {
                let marker = if theme.key == current { "*" } else { " " };
                vec![
                    marker.to_string(),
                    self.paint(theme.key),
                    theme.name.to_string(),
                    theme.description.to_string(),
                ]
            })
            .collect();
        write_table(out, headers, rows)
    }

    pub fn write_theme<W: Write>(&self, out: &mut W, theme: &MoodTheme) -> anyhow::Result<()> {
        writeln!(out, "theme       {} ({})", self.paint(theme.name), theme.key)?;
        writeln!(out, "primary     {}", theme.primary)?;
        writeln!(out, "secondary   {}", theme.secondary)?;
        writeln!(out, "background  {}", theme.background)?;
        writeln!(out, "accent      {}", theme.accent)?;
        writeln!(out, "sound       {}", theme.sound)?;
        writeln!(out, "about       {}", theme.description)?;
        Ok(())
    }

    pub fn write_boss<W: Write>(&self, out: &mut W, progress: Progress) -> anyhow::Result<()> {
        let health = progress.boss_health();
        let stage = BossStage::from_health(health);
        writeln!(
            out,
            "boss        {} [{}] {}%",
            self.paint(stage.label()),
            health_bar(health),
            health.floor()
        )?;
        writeln!(
            out,
            "progress    {}/{} completed",
            progress.completed, progress.total
        )?;
        if progress.total > 0 && stage != BossStage::Defeated {
            writeln!(
                out,
                "damage      {:.1}% per completed task",
                damage_per_task(progress.total)
            )?;
        }
        if progress.total > 0 && stage == BossStage::Defeated {
            writeln!(out, "{}", self.paint("VICTORY! The boss has been defeated."))?;
        }
        Ok(())
    }

    pub fn write_trophies<W: Write>(&self, out: &mut W, completed: usize) -> anyhow::Result<()> {
        writeln!(out, "Total completed: {completed} tasks")?;
        let headers = vec![
            " ".to_string(),
            "Trophy".to_string(),
            "Requirement".to_string(),
        ];
        let rows = trophies()
            .iter()
            .map(|trophy| {
                let unlocked = trophy.is_unlocked(completed);
                vec![
                    if unlocked { "*" } else { " " }.to_string(),
                    if unlocked {
                        self.paint(trophy.name)
                    } else {
                        trophy.name.to_string()
                    },
                    trophy.description.to_string(),
                ]
            })
            .collect();
        write_table(&mut *out, headers, rows)?;

        if let Some(next) = next_trophy(completed) {
            writeln!(
                out,
                "Next: {} in {} more",
                next.name,
                next.required - completed
            )?;
        }
        Ok(())
    }

    fn paint(&self, text: &str) -> String {
        match (self.color, self.accent) {
            (true, Some((r, g, b))) => format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    }
}

fn health_bar(health: f64) -> String {
    const WIDTH: usize = 20;
    let filled = ((health / 100.0) * WIDTH as f64).round().clamp(0.0, WIDTH as f64) as usize;
    format!("{}{}", "#".repeat(filled), "-".repeat(WIDTH - filled))
}

fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(digits.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{Renderer, health_bar, parse_hex_color, strip_ansi};
    use crate::game::Progress;
    use crate::task::Task;

    #[test]
    fn hex_colors_parse() {
        assert_eq!(parse_hex_color("#FFC107"), Some((255, 193, 7)));
        assert_eq!(parse_hex_color("FFC107"), None);
        assert_eq!(parse_hex_color("#FFF"), None);
    }

    #[test]
    fn health_bar_scales() {
        assert_eq!(health_bar(100.0), "#".repeat(20));
        assert_eq!(health_bar(0.0), "-".repeat(20));
        assert_eq!(health_bar(50.0).matches('#').count(), 10);
    }

    #[test]
    fn task_table_aligns_columns() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let mut done = Task::new("0123456789abcdef", "Buy milk", "2%", now);
        done.completed = true;
        let other = Task::new("t2", "Walk", "", now);

        let mut out = Vec::new();
        Renderer::plain()
            .write_task_table(&mut out, &[&done, &other])
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID       Done"));
        assert!(lines[2].starts_with("01234567 x"));
        assert!(lines[3].starts_with("t2         "));
    }

    #[test]
    fn boss_reports_victory_when_all_done() {
        let mut out = Vec::new();
        Renderer::plain()
            .write_boss(
                &mut out,
                Progress {
                    completed: 2,
                    total: 2,
                },
            )
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("defeated"));
        assert!(text.contains("VICTORY"));
    }

    #[test]
    fn strip_ansi_removes_escapes() {
        assert_eq!(strip_ansi("\x1b[38;2;1;2;3mhi\x1b[0m"), "hi");
    }
}
