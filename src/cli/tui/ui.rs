//! UI rendering for the TUI.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Sparkline, Table, Wrap},
};

use crate::cli::format::{format_bytes, format_duration_secs, format_timestamp};
use crate::core::models::{Job, JobStatus};

use super::app::{Confirm, OPERATIONS, TuiApp, View};

/// Main render function - dispatches to view-specific renderers.
pub fn render(frame: &mut Frame, app: &TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer/help
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match &app.view {
        View::Operations { selected } => render_operations(frame, chunks[1], *selected),
        View::Jobs { selected, detail } => render_jobs(frame, app, chunks[1], *selected, *detail),
        View::Stats { selected } => render_stats(frame, app, chunks[1], *selected),
        View::Configs { selected } => render_configs(frame, app, chunks[1], *selected),
    }

    render_footer(frame, app, chunks[2]);

    if app.confirm.is_some() {
        render_confirm(frame, app);
    }
}

fn render_header(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let config = app.data.selected_config_name().unwrap_or("(no config)");
    let title = format!(
        " DashBorg  [1] Operations  [2] Jobs  [3] Stats  [4] Configs  |  config: {config} "
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(block, area);
}

fn render_operations(frame: &mut Frame, area: Rect, selected: usize) {
    let block = Block::default()
        .title("Operations")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let items: Vec<ListItem> = OPERATIONS
        .iter()
        .enumerate()
        .map(|(i, (_, label))| {
            let is_selected = i == selected;
            let style = if is_selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let marker = if is_selected { "> " } else { "  " };
            ListItem::new(Line::from(format!("{marker}{label}"))).style(style)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

fn render_jobs(frame: &mut Frame, app: &TuiApp, area: Rect, selected: usize, detail: bool) {
    let block = Block::default()
        .title("Jobs")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.data.jobs.is_empty() {
        let text = Paragraph::new("  No jobs yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let (list_area, detail_area) = if detail {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    let items: Vec<ListItem> = app
        .data
        .jobs
        .iter()
        .enumerate()
        .map(|(i, job)| {
            let is_selected = i == selected;
            let style = if is_selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let status_icon = match job.status {
                JobStatus::Completed => Span::styled("✓", Style::default().fg(Color::Green)),
                JobStatus::Failed => Span::styled("✗", Style::default().fg(Color::Red)),
                JobStatus::Running => Span::styled("▶", Style::default().fg(Color::Yellow)),
                JobStatus::Queued => Span::styled("•", Style::default().fg(Color::DarkGray)),
            };

            let line = Line::from(vec![
                Span::raw(if is_selected { "> " } else { "  " }),
                status_icon,
                Span::raw(format!(
                    "  {}  {:<11} {:<9} {}",
                    format_timestamp(job.created_at),
                    job.job_type.label(),
                    job.status.label(),
                    job.config,
                )),
            ]);

            ListItem::new(line).style(style)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, list_area);

    if let Some(detail_area) = detail_area
        && let Some(job) = app.data.jobs.get(selected)
    {
        render_job_detail(frame, job, detail_area);
    }
}

fn render_job_detail(frame: &mut Frame, job: &Job, area: Rect) {
    let block = Block::default()
        .title("Job Details")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let label = |text: &str| Span::styled(format!("  {text:<12}"), Style::default().fg(Color::Cyan));

    let mut lines = vec![
        Line::from(vec![label("Job ID:"), Span::raw(job.id.clone())]),
        Line::from(vec![label("Type:"), Span::raw(job.job_type.label())]),
        Line::from(vec![label("Config:"), Span::raw(job.config.clone())]),
        Line::from(vec![label("Status:"), Span::raw(job.status.label())]),
        Line::from(vec![
            label("Created:"),
            Span::raw(format_timestamp(job.created_at)),
        ]),
    ];
    if let Some(completed_at) = job.completed_at {
        lines.push(Line::from(vec![
            label("Completed:"),
            Span::raw(format_timestamp(completed_at)),
        ]));
    }

    // Progress lines appear only while data exists: a zero file count and a
    // missing current file are simply omitted, never rendered as zeros.
    if job.status == JobStatus::Running
        && let Some(progress) = &job.progress_info
    {
        lines.push(Line::from(""));
        if progress.files_processed > 0 {
            lines.push(Line::from(vec![
                label("Progress:"),
                Span::raw(format!("{} files processed", progress.files_processed)),
            ]));
        }
        if let Some(file) = &progress.current_file {
            lines.push(Line::from(vec![label("File:"), Span::raw(file.clone())]));
        }
    }

    if job.status == JobStatus::Completed
        && let Some(stats) = &job.stats
    {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Backup Statistics",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        if let Some(repo) = &stats.repository {
            lines.push(Line::from(vec![
                label("Repository:"),
                Span::raw(repo.display_name().to_string()),
            ]));
        }
        if let Some(archive) = &stats.archive {
            if let Some(name) = &archive.name {
                lines.push(Line::from(vec![label("Archive:"), Span::raw(name.clone())]));
            }
            if let Some(duration) = archive.duration {
                lines.push(Line::from(vec![
                    label("Duration:"),
                    Span::raw(format_duration_secs(duration)),
                ]));
            }
        }
        if let Some(sizes) = stats.size_stats() {
            lines.push(Line::from(vec![
                label("Original:"),
                Span::raw(format_bytes(sizes.original_size)),
            ]));
            lines.push(Line::from(vec![
                label("Compressed:"),
                Span::raw(format_bytes(sizes.compressed_size)),
            ]));
            lines.push(Line::from(vec![
                label("Dedup:"),
                Span::raw(format_bytes(sizes.deduplicated_size)),
            ]));
            lines.push(Line::from(vec![
                label("Files:"),
                Span::raw(sizes.nfiles.to_string()),
            ]));
            if sizes.original_size > 0 {
                lines.push(Line::from(vec![
                    label("Space saved:"),
                    Span::styled(
                        format!("{:.1}%", sizes.space_saved_percent()),
                        Style::default().fg(Color::Green),
                    ),
                ]));
            }
        }
    }

    if let Some(transcript) = job.transcript() {
        lines.push(Line::from(""));
        let heading = if job.status == JobStatus::Failed {
            Span::styled(
                "  Error",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(
                "  Output",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        };
        lines.push(Line::from(heading));
        for raw in transcript.lines() {
            lines.push(Line::from(format!("  {raw}")));
        }
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    frame.render_widget(paragraph, area);
}

fn render_stats(frame: &mut Frame, app: &TuiApp, area: Rect, selected: usize) {
    let Some(dashboard) = &app.data.dashboard else {
        let block = Block::default()
            .title("Statistics")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let text = Paragraph::new("  Loading statistics... ([s] to sync, [r] to reload)")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Summary cards
            Constraint::Length(5), // Storage trend
            Constraint::Length(6), // Repositories
            Constraint::Min(0),    // Archives table
        ])
        .split(area);

    // Summary cards
    let summary = &dashboard.summary;
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(chunks[0]);

    let card = |title: &'static str, value: String| {
        Paragraph::new(Line::from(Span::styled(
            format!("  {value}"),
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
    };

    frame.render_widget(
        card("Repositories", summary.total_repositories.to_string()),
        cards[0],
    );
    frame.render_widget(card("Archives", summary.total_archives.to_string()), cards[1]);
    frame.render_widget(
        card("Storage used", format_bytes(summary.total_unique_size)),
        cards[2],
    );
    frame.render_widget(
        card(
            "Deduplication",
            format!(
                "{:.1}% ({} saved)",
                dashboard.deduplication_percentage(),
                format_bytes(summary.space_saved_bytes()),
            ),
        ),
        cards[3],
    );

    // Storage trend, oldest to newest
    let trend: Vec<u64> = dashboard
        .storage_trend()
        .iter()
        .map(|p| p.original_size)
        .collect();
    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title("Backup size over time")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .data(&trend)
        .style(Style::default().fg(Color::Green));
    frame.render_widget(sparkline, chunks[1]);

    // Repositories
    let repo_items: Vec<ListItem> = dashboard
        .repositories
        .iter()
        .enumerate()
        .map(|(i, repo)| {
            let filtered = app.data.repo_filter == Some(i);
            let style = if filtered {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(format!(
                "  {}  {}  {} archives  {}",
                repo.label,
                repo.location,
                repo.archive_count,
                repo.encryption_mode.as_deref().unwrap_or("-"),
            )))
            .style(style)
        })
        .collect();
    let repos = List::new(repo_items).block(
        Block::default()
            .title("Repositories ([f] filter)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(repos, chunks[2]);

    render_archive_table(frame, app, chunks[3], selected);
}

fn render_archive_table(frame: &mut Frame, app: &TuiApp, area: Rect, selected: usize) {
    let Some(dashboard) = &app.data.dashboard else {
        return;
    };

    let filter = app.data.repo_filter_label().map(str::to_string);
    let archives = dashboard.filtered_archives(&app.data.archive_search, filter.as_deref());

    let mut title = String::from("Archives ([e] extract, [m] mount)");
    if app.search_mode || !app.data.archive_search.is_empty() {
        title.push_str(&format!(" | search: {}_", app.data.archive_search));
    }
    if let Some(label) = &filter {
        title.push_str(&format!(" | repo: {label}"));
    }

    let header = Row::new(vec!["Name", "Repository", "Start", "Size", "Dedup", "Files"])
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = archives
        .iter()
        .enumerate()
        .map(|(i, archive)| {
            let style = if i == selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(archive.name.clone()),
                Cell::from(archive.repository.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(
                    archive
                        .start
                        .map(format_timestamp)
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::from(archive.original_size.map(format_bytes).unwrap_or_default()),
                Cell::from(
                    archive
                        .deduplicated_size
                        .map(format_bytes)
                        .unwrap_or_default(),
                ),
                Cell::from(archive.nfiles.map(|n| n.to_string()).unwrap_or_default()),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Percentage(15),
            Constraint::Percentage(20),
            Constraint::Percentage(12),
            Constraint::Percentage(12),
            Constraint::Percentage(11),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    frame.render_widget(table, area);
}

fn render_configs(frame: &mut Frame, app: &TuiApp, area: Rect, selected: usize) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    let block = Block::default()
        .title("Config Documents")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.data.config_files.is_empty() {
        let text = Paragraph::new("  No config documents")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, chunks[0]);
    } else {
        let items: Vec<ListItem> = app
            .data
            .config_files
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let is_selected = i == selected;
                let style = if is_selected {
                    Style::default()
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let active = if i == app.data.selected_config { "*" } else { " " };
                ListItem::new(Line::from(format!("{active} {name}"))).style(style)
            })
            .collect();
        frame.render_widget(List::new(items).block(block), chunks[0]);
    }

    // Preview pane with the validation verdict, when one was requested.
    let mut title = String::from("Preview ([Enter] load, [v] validate)");
    if let Some((name, _)) = &app.data.config_preview {
        title = format!("Preview: {name} ([v] validate)");
    }
    let preview_block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let mut lines: Vec<Line> = Vec::new();
    if let Some(verdict) = &app.data.verdict {
        if verdict.valid {
            lines.push(Line::from(Span::styled(
                "  ✓ valid",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "  ✗ invalid",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            if let Some(error) = &verdict.error {
                for raw in error.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("  {raw}"),
                        Style::default().fg(Color::Red),
                    )));
                }
            }
        }
        lines.push(Line::from(""));
    }
    match &app.data.config_preview {
        Some((_, text)) => {
            for raw in text.lines() {
                lines.push(Line::from(format!("  {raw}")));
            }
        }
        None => lines.push(Line::from(Span::styled(
            "  Select a document and press Enter",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    let paragraph = Paragraph::new(lines).block(preview_block);
    frame.render_widget(paragraph, chunks[1]);
}

fn render_footer(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let help_text = match &app.view {
        View::Operations { .. } => "[↑↓] Navigate  [←→] Config  [Enter] Run  [1-4] Views  [q] Quit",
        View::Jobs { .. } => "[↑↓] Navigate  [Enter/d] Details  [r] Refresh  [Esc] Back  [q] Quit",
        View::Stats { .. } => {
            "[↑↓] Archive  [e] Extract  [m] Mount  [s] Sync  [r] Reload  [/] Search  [f] Filter  [q] Quit"
        }
        View::Configs { .. } => "[↑↓] Navigate  [Enter] Load  [v] Validate  [q] Quit",
    };

    let mut spans = vec![Span::raw(format!("  {help_text}"))];
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!("  | {status}"),
            Style::default().fg(Color::Yellow),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

/// Centered modal asking for a yes/no answer before a destructive or
/// host-writing dispatch.
fn render_confirm(frame: &mut Frame, app: &TuiApp) {
    let Some(confirm) = &app.confirm else {
        return;
    };
    let area = centered_rect(60, 7, frame.area());
    frame.render_widget(Clear, area);

    let config = app.data.selected_config_name().unwrap_or("(no config)");
    let (title, warning) = match confirm {
        Confirm::LivePrune => (
            "Confirm Live Prune",
            format!("  Live prune will permanently delete archives of {config}."),
        ),
        Confirm::Extract { archive } => (
            "Confirm Extract",
            format!("  Extract {archive} onto the engine host using {config}."),
        ),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            warning,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  Continue? [y] yes  [n/Esc] no"),
    ];

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered_rect(width_pct: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_pct) / 2),
            Constraint::Percentage(width_pct),
            Constraint::Percentage((100 - width_pct) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
