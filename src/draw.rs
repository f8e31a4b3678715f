use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::bracket::{BracketGrid, BracketView};
use crate::state::app_state::{
    ArticleField, ScoreField, Toast, ToastLevel, TournamentField,
};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use edusports_api::{Match, MatchStatus, RegistrationStatus, Tournament, round_label};

static TABS: &[&str; 6] = &["Tournaments", "Detail", "Bracket", "Matches", "Teams", "News"];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    terminal
        .draw(|f| {
            if app.state.session_expired {
                draw_login_notice(f, f.area());
                draw_toasts(f, f.area(), app.state.toasts.visible());
                return;
            }

            layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

            if !app.settings.full_screen {
                draw_tabs(f, layout.tab_bar, app);
            }

            match app.state.active_tab {
                MenuItem::Tournaments => draw_tournaments(f, layout.main, app),
                MenuItem::Detail => draw_detail(f, layout.main, app),
                MenuItem::Bracket => draw_bracket(f, layout.main, app),
                MenuItem::Matches => draw_matches(f, layout.main, app),
                MenuItem::Teams => draw_teams(f, layout.main, app),
                MenuItem::News => draw_news(f, layout.main, app),
                MenuItem::Help => draw_help(f, layout.main),
            }

            if layout.logs != Rect::ZERO {
                draw_logs(f, layout.logs);
            }

            draw_toasts(f, f.area(), app.state.toasts.visible());
            draw_loading_spinner(f, f.area(), app, loading);
        })
        .unwrap();
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_login_notice(f: &mut Frame, area: Rect) {
    let block = default_border(Color::Red).title(" Session ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text = "Not authenticated.\n\n\
        The stored API token was missing or rejected by the server.\n\
        Export a fresh token and restart:\n\n\
        ESTUI_API_TOKEN=<token> estui\n\n\
        Press q to quit";
    let [_top, body, _bottom] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(8),
        Constraint::Fill(1),
    ])
    .areas(inner);
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        body,
    );
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Tournaments => 0,
        MenuItem::Detail => 1,
        MenuItem::Bracket => 2,
        MenuItem::Matches => 3,
        MenuItem::Teams => 4,
        MenuItem::News => 5,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Tournament list
// ---------------------------------------------------------------------------

fn draw_tournaments(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Tournaments ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let page = app.state.list.current_page();

    let mut lines: Vec<Line> = Vec::with_capacity(page.items.len() + 3);
    lines.push(Line::from(Span::styled(
        format!(
            "Page {}/{} ({} total)",
            page.page, page.total_pages, page.total
        ),
        Style::default().fg(Color::Gray),
    )));
    lines.push(Line::from(Span::styled(
        "j/k=move  n/p=page  Enter=open  c=create  e=edit  d=delete  r=reload",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    if page.items.is_empty() {
        lines.push(Line::from(Span::styled(
            "No tournaments. Press c to create one.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for (idx, t) in page.items.iter().enumerate() {
        let selected = idx == app.state.list.selected;
        let marker = if selected { '>' } else { ' ' };
        let armed = app.state.list.confirm_delete.as_deref() == Some(t.id.as_str());
        let style = if armed {
            Style::default().fg(Color::Red)
        } else if selected {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(
            format!(
                "{marker} {:<30} {:<14} {:>3}/{:<3} {}",
                clip(&t.name, 30),
                t.status.label(),
                t.current_teams,
                t.max_teams,
                date_range(t),
            ),
            style,
        )));
    }

    f.render_widget(Paragraph::new(lines), inner);

    if let Some(form) = &app.state.list.form {
        let title = if form.editing_id.is_some() { " Edit tournament " } else { " New tournament " };
        let popup = centered_rect(46, 7, area);
        f.render_widget(Clear, popup);
        let block = default_border(Color::Yellow).title(title);
        let inner = block.inner(popup);
        f.render_widget(block, popup);
        let lines = vec![
            input_line("Name     ", &form.name, form.focus == TournamentField::Name),
            input_line("Max teams", &form.max_teams, form.focus == TournamentField::MaxTeams),
            Line::from(""),
            Line::from(Span::styled(
                "Tab=field  Enter=save  Esc=cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        f.render_widget(Paragraph::new(lines), inner);
    }
}

fn date_range(t: &Tournament) -> String {
    match (t.starts_at, t.ends_at) {
        (Some(s), Some(e)) => format!("{} – {}", s.format("%Y-%m-%d"), e.format("%Y-%m-%d")),
        (Some(s), None) => format!("from {}", s.format("%Y-%m-%d")),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tournament detail + lifecycle
// ---------------------------------------------------------------------------

fn draw_detail(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Tournament ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(t) = app.state.detail.tournament.as_ref() else {
        f.render_widget(
            Paragraph::new("No tournament open. Press Enter on the Tournaments tab.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let total_rounds = app.state.bracket.bracket.max_round();
    let active = app.state.detail.active_round();
    let round_line = if total_rounds == 0 {
        "Bracket: not generated".to_string()
    } else if active > total_rounds {
        "Bracket: all rounds settled".to_string()
    } else {
        format!("Current round: {}", round_label(active, total_rounds))
    };

    let winner = t
        .winner_team
        .as_ref()
        .map(|w| w.name.as_str())
        .unwrap_or("TBD");
    let runner_up = t
        .runner_up_team
        .as_ref()
        .map(|w| w.name.as_str())
        .unwrap_or("TBD");

    let mut lines = vec![
        Line::from(Span::styled(
            t.name.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Status:  {}", t.status.label())),
        Line::from(format!("Teams:   {}/{}", t.current_teams, t.max_teams)),
        Line::from(format!("Dates:   {}", date_range(t))),
        Line::from(round_line),
        Line::from(""),
        Line::from(format!("Winner:     {winner}")),
        Line::from(format!("Runner-up:  {runner_up}")),
        Line::from(""),
    ];

    lines.push(Line::from(Span::styled(
        "g=generate bracket  s=start  a=advance round  F=complete (press twice)  r=reload",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Paragraph::new(lines), inner);
}

// ---------------------------------------------------------------------------
// Bracket
// ---------------------------------------------------------------------------

fn draw_bracket(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Bracket ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let bracket = &app.state.bracket.bracket;
    if bracket.rounds.is_empty() {
        f.render_widget(
            Paragraph::new("No bracket yet. Generate one from the Detail tab (g).")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let [header, key_legend, content] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let total = bracket.max_round();
    f.render_widget(
        Paragraph::new(format!(
            "{} | viewing {}",
            app.state
                .detail
                .tournament
                .as_ref()
                .map(|t| t.name.as_str())
                .unwrap_or("Bracket"),
            round_label(app.state.bracket.view_round, total),
        )),
        header,
    );
    f.render_widget(
        Paragraph::new("h/l=round  j/k=match  Enter=enter result  ?=help")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    // Rebuilt per frame; the grid is a handful of small cells.
    let grid = BracketGrid::compute(content.width, total);
    f.render_widget(
        BracketView {
            bracket,
            grid: &grid,
            selected_round: app.state.bracket.view_round,
            selected_match: app.state.bracket.selected_match,
            scroll_offset: app.state.bracket.scroll_offset,
        },
        content,
    );
}

// ---------------------------------------------------------------------------
// Match list + result entry
// ---------------------------------------------------------------------------

fn draw_matches(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Matches ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let matches = &app.state.detail.matches;
    if matches.is_empty() {
        f.render_widget(
            Paragraph::new("No matches. Open a tournament and generate a bracket first.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let total_rounds = app.state.bracket.bracket.max_round();
    let mut lines: Vec<Line> = Vec::with_capacity(matches.len() + 2);
    lines.push(Line::from(Span::styled(
        "j/k=move  Enter=enter result",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    for (idx, m) in matches.iter().enumerate() {
        let selected = idx == app.state.matches.selected;
        let marker = if selected { '>' } else { ' ' };
        let style = match m.status {
            _ if selected => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            MatchStatus::InProgress => Style::default().fg(Color::Green),
            MatchStatus::Completed => Style::default().fg(Color::Gray),
            _ => Style::default().fg(Color::DarkGray),
        };
        lines.push(Line::from(Span::styled(
            format!("{marker} {}", format_match_line(m, total_rounds)),
            style,
        )));
    }

    f.render_widget(Paragraph::new(lines), inner);

    if let Some(form) = &app.state.matches.form {
        let popup = centered_rect(40, 7, area);
        f.render_widget(Clear, popup);
        let block = default_border(Color::Yellow).title(" Enter result ");
        let popup_inner = block.inner(popup);
        f.render_widget(block, popup);

        let (name1, name2) = app
            .state
            .detail
            .matches
            .iter()
            .find(|m| m.id == form.match_id)
            .map(|m| {
                (
                    m.team1.as_ref().map(|t| t.name.clone()).unwrap_or_else(|| "TBD".into()),
                    m.team2.as_ref().map(|t| t.name.clone()).unwrap_or_else(|| "TBD".into()),
                )
            })
            .unwrap_or_else(|| ("Team 1".into(), "Team 2".into()));

        let lines = vec![
            input_line(&clip(&name1, 16), &form.score1, form.focus == ScoreField::Team1),
            input_line(&clip(&name2, 16), &form.score2, form.focus == ScoreField::Team2),
            Line::from(""),
            Line::from(Span::styled(
                "Tab=field  Enter=save  Esc=cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        f.render_widget(Paragraph::new(lines), popup_inner);
    }
}

fn format_match_line(m: &Match, total_rounds: u32) -> String {
    let t1 = m.team1.as_ref().map(|t| t.name.as_str()).unwrap_or("TBD");
    let t2 = m.team2.as_ref().map(|t| t.name.as_str()).unwrap_or("TBD");
    let score = match (m.score1, m.score2) {
        (Some(a), Some(b)) => format!("{a:>2}-{b:<2}"),
        _ => "  -  ".to_string(),
    };
    format!(
        "{:<14} {:<18} {score} {:<18} [{}]",
        round_label(m.round, total_rounds),
        clip(t1, 18),
        clip(t2, 18),
        m.status.label(),
    )
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

fn draw_teams(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Teams ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let teams = &app.state.detail.teams;

    let mut lines: Vec<Line> = Vec::with_capacity(teams.len() + 2);
    lines.push(Line::from(Span::styled(
        "j/k=move  a=approve  x=reject  n=register new team",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    if teams.is_empty() {
        lines.push(Line::from(Span::styled(
            "No registrations yet.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for (idx, team) in teams.iter().enumerate() {
        let selected = idx == app.state.teams.selected;
        let marker = if selected { '>' } else { ' ' };
        let status_color = match team.registration_status {
            RegistrationStatus::Approved => Color::Green,
            RegistrationStatus::Rejected => Color::Red,
            RegistrationStatus::Pending => Color::Yellow,
            RegistrationStatus::Unknown => Color::DarkGray,
        };
        let name_style = if selected {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker} {:<30} ", clip(&team.name, 30)), name_style),
            Span::styled(
                team.registration_status.label(),
                Style::default().fg(status_color),
            ),
        ]));
    }

    f.render_widget(Paragraph::new(lines), inner);

    if app.state.teams.registering {
        let popup = centered_rect(44, 5, area);
        f.render_widget(Clear, popup);
        let block = default_border(Color::Yellow).title(" Register team ");
        let popup_inner = block.inner(popup);
        f.render_widget(block, popup);
        let lines = vec![
            input_line("Name", &app.state.teams.register_input, true),
            Line::from(Span::styled(
                "Enter=register  Esc=cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        f.render_widget(Paragraph::new(lines), popup_inner);
    }
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

fn draw_news(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" News ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [list_area, body_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(inner);

    let mut lines: Vec<Line> = Vec::with_capacity(app.state.news.articles.len() + 2);
    lines.push(Line::from(Span::styled(
        "c=new  e=edit  d=delete  u=attach  r=reload",
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));

    if app.state.news.articles.is_empty() {
        lines.push(Line::from(Span::styled(
            "No articles. Press c to write one.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for (idx, article) in app.state.news.articles.iter().enumerate() {
        let selected = idx == app.state.news.selected;
        let marker = if selected { '>' } else { ' ' };
        let armed = app.state.news.confirm_delete.as_deref() == Some(article.id.as_str());
        let style = if armed {
            Style::default().fg(Color::Red)
        } else if selected {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let attach = if article.attachments.is_empty() {
            String::new()
        } else {
            format!(" ({})", article.attachments.len())
        };
        lines.push(Line::from(Span::styled(
            format!(
                "{marker} {}{attach}",
                clip(&article.name, list_area.width.saturating_sub(6) as usize)
            ),
            style,
        )));
    }

    f.render_widget(Paragraph::new(lines), list_area);

    let body_block = default_border(Color::DarkGray).title(" Article ");
    let body_inner = body_block.inner(body_area);
    f.render_widget(body_block, body_area);
    if let Some(article) = app.state.news.selected_article() {
        let mut body_lines = vec![
            Line::from(Span::styled(
                article.name.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for chunk in article.content.lines() {
            body_lines.push(Line::from(chunk.to_string()));
        }
        if !article.attachments.is_empty() {
            body_lines.push(Line::from(""));
            for a in &article.attachments {
                body_lines.push(Line::from(Span::styled(
                    format!("  {}", a.url),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
        f.render_widget(Paragraph::new(body_lines), body_inner);
    }

    if let Some(form) = &app.state.news.form {
        let title = if form.editing_id.is_some() { " Edit article " } else { " New article " };
        let popup = centered_rect(60, 8, area);
        f.render_widget(Clear, popup);
        let block = default_border(Color::Yellow).title(title);
        let popup_inner = block.inner(popup);
        f.render_widget(block, popup);
        let lines = vec![
            input_line("Title  ", &form.name, form.focus == ArticleField::Name),
            input_line("Content", &form.content, form.focus == ArticleField::Content),
            Line::from(""),
            Line::from(Span::styled(
                "Tab=field  Enter=publish  Esc=cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        f.render_widget(Paragraph::new(lines), popup_inner);
    }

    if app.state.news.uploading {
        let popup = centered_rect(60, 5, area);
        f.render_widget(Clear, popup);
        let block = default_border(Color::Yellow).title(" Attach file ");
        let popup_inner = block.inner(popup);
        f.render_widget(block, popup);
        let lines = vec![
            input_line("Path", &app.state.news.upload_input, true),
            Line::from(Span::styled(
                "Enter=upload  Esc=cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        f.render_widget(Paragraph::new(lines), popup_inner);
    }
}

// ---------------------------------------------------------------------------
// Help, logs, overlays
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text = "\
Tabs      1=Tournaments  2=Detail  3=Bracket  4=Matches  5=Teams  6=News
Global    q=quit  f=full screen  \"=log pane  ?=this screen  Esc=back

Tournaments   j/k=move  n/p=page  Enter=open  c=create  e=edit  d=delete (twice)  r=reload
Detail        g=generate bracket  s=start  a=advance round  F=complete (press twice)  r=reload
Bracket       h/l=round  j/k=match  PgUp/PgDn=scroll  Enter=enter result
Matches       j/k=move  Enter=enter result
Teams         j/k=move  a=approve  x=reject  n=register
News          j/k=move  c=new  e=edit  d=delete (twice)  u=attach file  r=reload";

    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::Gray)),
        inner,
    );
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let widget = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(widget, area);
}

fn draw_toasts(f: &mut Frame, area: Rect, toasts: &[Toast]) {
    if toasts.is_empty() {
        return;
    }
    let width = 44u16.min(area.width.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(width + 1);
    let mut y = area.y + area.height.saturating_sub(toasts.len() as u16 + 1);

    for toast in toasts {
        let color = match toast.level {
            ToastLevel::Info => Color::Gray,
            ToastLevel::Success => Color::Green,
            ToastLevel::Error => Color::Red,
        };
        let rect = Rect::new(x, y, width, 1);
        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(clip(&toast.message, width as usize))
                .style(Style::default().fg(color)),
            rect,
        );
        y += 1;
    }
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

// ---------------------------------------------------------------------------
// Small helpers
// ---------------------------------------------------------------------------

fn input_line<'a>(label: &str, value: &str, focused: bool) -> Line<'a> {
    let label_style = Style::default().fg(Color::Gray);
    let value_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{label}: "), label_style),
        Span::styled(format!("{value}{cursor}"), value_style),
    ])
}

fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect::new(
        r.x + (r.width - width) / 2,
        r.y + (r.height - height) / 2,
        width,
        height,
    )
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
    }
}
