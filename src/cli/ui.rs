use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Tabs,
        Wrap,
    },
    Frame,
};
use rust_decimal::prelude::ToPrimitive;

use crate::cli::state::{App, ComparisonPane, Severity, Tab};
use crate::cli::util::{fmt_amount, fmt_money};

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.size();

    // Top tabs | main content | bottom status bar
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(size);

    let titles = ["Dashboard", "Rules", "Comparisons", "Profile", "Help"]
        .into_iter()
        .map(|t| Line::from(Span::raw(t)))
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .select(match app.tab {
            Tab::Dashboard => 0,
            Tab::Rules => 1,
            Tab::Comparisons => 2,
            Tab::Profile => 3,
            Tab::Help => 4,
        })
        .block(Block::default().borders(Borders::ALL).title("Budget Planner"))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(tabs, root[0]);

    match app.tab {
        Tab::Dashboard => draw_dashboard(f, root[1], app),
        Tab::Rules => draw_rules(f, root[1], app),
        Tab::Comparisons => draw_comparisons(f, root[1], app),
        Tab::Profile => draw_profile(f, root[1], app),
        Tab::Help => draw_help(f, root[1]),
    }

    let status = Paragraph::new(app.status.clone());
    f.render_widget(status, root[2]);

    if app.dashboard.creating {
        let area = center_rect(root[1], 54, 11);
        f.render_widget(Clear, area);
        draw_category_modal(f, area, app);
    }
    if app.rules.creating {
        let area = center_rect(root[1], 58, 13);
        f.render_widget(Clear, area);
        draw_rule_modal(f, area, app);
    }
    if app.profile.password_dialog {
        let area = center_rect(root[1], 48, 9);
        f.render_widget(Clear, area);
        draw_password_modal(f, area, app);
    }
    if app.profile.login_dialog {
        let area = center_rect(root[1], 52, 12);
        f.render_widget(Clear, area);
        draw_login_modal(f, area, app);
    }
}

// Dashboard Page

fn draw_dashboard(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(4)])
        .split(area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[0]);

    let items: Vec<ListItem> = app
        .dashboard
        .categories
        .iter()
        .map(|c| {
            let tail = if c.priority == 1 {
                if c.is_paid.unwrap_or(false) {
                    "Paid".to_string()
                } else {
                    "Not Paid".to_string()
                }
            } else {
                format!("{}/{}", fmt_money(&c.spent), fmt_money(&c.budget))
            };
            ListItem::new(Line::from(format!("{}  [P{}]  {}", c.name, c.priority, tail)))
        })
        .collect();

    let len = app.dashboard.categories.len();
    if let Some(i) = app.dashboard.sel.selected() {
        if i >= len {
            app.dashboard
                .sel
                .select(if len == 0 { None } else { Some(len - 1) });
        }
    } else if len > 0 {
        app.dashboard.sel.select(Some(0));
    }

    let title = format!(
        "Dashboard — Rule Selected: {}  (n=new, +/-=spend, p=paid)",
        app.selected_rule_name()
    );
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, cols[0], &mut app.dashboard.sel);

    // Details for the selected category
    let detail = Block::default().borders(Borders::ALL).title("Details");
    let selected = app
        .dashboard
        .sel
        .selected()
        .and_then(|i| app.dashboard.categories.get(i));
    match selected {
        Some(cat) if cat.priority != 1 => {
            let inner = detail.inner(cols[1]);
            f.render_widget(detail, cols[1]);
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(4), Constraint::Length(3), Constraint::Min(0)])
                .split(inner);
            let info = Paragraph::new(format!(
                "Name    : {}\nPriority: {}\nBudget  : {}\nSpent   : {}",
                cat.name,
                cat.priority,
                fmt_money(&cat.budget),
                fmt_money(&cat.spent)
            ));
            f.render_widget(info, parts[0]);

            let ratio = cat
                .spent
                .checked_div(cat.budget)
                .and_then(|r| r.to_f64())
                .unwrap_or(0.0)
                .clamp(0.0, 1.0);
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(progress_color(ratio * 100.0)))
                .ratio(ratio)
                .label(format!("{:.0}%", ratio * 100.0));
            f.render_widget(gauge, parts[1]);
        }
        Some(cat) => {
            let paid = cat.is_paid.unwrap_or(false);
            let text = Paragraph::new(vec![
                Line::from(format!("Name    : {}", cat.name)),
                Line::from("Priority: 1 (Essential)".to_string()),
                Line::from(format!("Budget  : {}", fmt_money(&cat.budget))),
                Line::from(""),
                Line::from(Span::styled(
                    if paid { " Paid " } else { " Not Paid " },
                    Style::default()
                        .fg(if paid { Color::Green } else { Color::Red })
                        .add_modifier(Modifier::REVERSED),
                )),
            ])
            .block(detail);
            f.render_widget(text, cols[1]);
        }
        None => {
            f.render_widget(Paragraph::new("No category selected").block(detail), cols[1]);
        }
    }

    // Static monthly summary tiles, same numbers the web dashboard shows.
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(rows[1]);
    for (rect, (label, value)) in tiles.iter().zip([
        ("Needs Remaining", "₹15,000"),
        ("Wants Remaining", "₹9,000"),
        ("Savings Remaining", "₹6,000"),
    ]) {
        let tile = Paragraph::new(value)
            .block(Block::default().borders(Borders::ALL).title(label));
        f.render_widget(tile, *rect);
    }
}

fn progress_color(percentage: f64) -> Color {
    if percentage < 10.0 {
        Color::Red
    } else if percentage > 90.0 {
        Color::Green
    } else {
        Color::Blue
    }
}

fn draw_category_modal(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.dashboard.form;
    let marker = |i: usize| if form.focus == i { "  <editing>" } else { "" };

    let priority_label = match form.priority {
        1 => "1 (Essential)",
        2 => "2 (Lifestyle)",
        _ => "3 (Savings)",
    };
    let lines = vec![
        format!("Name     : {}{}", form.name.rendered(), marker(0)),
        format!(
            "Priority : {}{}{}",
            priority_label,
            if form.focus == 1 { "  (←/→ to change)" } else { "" },
            marker(1)
        ),
        format!("Budget   : {}{}", form.budget.rendered(), marker(2)),
        "".into(),
        "TAB: switch field | Enter: add | Esc: cancel".into(),
        form.error.clone().unwrap_or_default(),
    ]
    .join("\n");

    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Add New Category"));
    f.render_widget(p, area);
}

// Rules Page

fn draw_rules(f: &mut Frame, area: Rect, app: &mut App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let items: Vec<ListItem> = app
        .rules
        .rules
        .iter()
        .map(|r| {
            let mark = if r.selected { "✓ " } else { "  " };
            ListItem::new(Line::from(format!(
                "{}{}  ({}/{}/{})",
                mark, r.name, r.needs, r.wants, r.savings
            )))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Budgeting Rules  (Enter=select, n=create)"),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, cols[0], &mut app.rules.sel);

    let right = if let Some(rule) = app
        .rules
        .sel
        .selected()
        .and_then(|i| app.rules.rules.get(i))
    {
        Paragraph::new(format!(
            "{}\n\n{}\n\nAllocations:\n  Needs  : {}%\n  Wants  : {}%\n  Savings: {}%{}",
            rule.name,
            rule.description,
            rule.needs,
            rule.wants,
            rule.savings,
            if rule.selected { "\n\nCurrently Selected" } else { "" }
        ))
        .wrap(Wrap { trim: true })
    } else {
        Paragraph::new("No rule selected")
    }
    .block(Block::default().borders(Borders::ALL).title("Details"));
    f.render_widget(right, cols[1]);
}

fn draw_rule_modal(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.rules.form;
    let marker = |i: usize| if form.focus == i { "  <editing>" } else { "" };

    let lines = vec![
        format!("Name        : {}{}", form.name.rendered(), marker(0)),
        format!("Description : {}{}", form.description.rendered(), marker(1)),
        "Allocations (must total 100%)".into(),
        format!("  Needs (%)  : {}{}", form.needs.rendered(), marker(2)),
        format!("  Wants (%)  : {}{}", form.wants.rendered(), marker(3)),
        format!("  Savings (%): {}{}", form.savings.rendered(), marker(4)),
        "".into(),
        "TAB: switch field | Enter: create | Esc: cancel".into(),
        form.error.clone().unwrap_or_default(),
    ]
    .join("\n");

    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Create Custom Budgeting Rule"),
    );
    f.render_widget(p, area);
}

// Monthly Comparisons Page

fn draw_comparisons(f: &mut Frame, area: Rect, app: &App) {
    if app.comparisons.loading || app.comparisons.months.is_empty() {
        let p = Paragraph::new("Loading…")
            .block(Block::default().borders(Borders::ALL).title("Monthly Comparisons"));
        f.render_widget(p, center_rect(area, 20, 3));
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(8)])
        .split(area);

    let titles = ["Current Month", "Monthly Comparison", "Recommendations"]
        .into_iter()
        .map(|t| Line::from(Span::raw(t)))
        .collect::<Vec<_>>();
    let pane = app.comparisons.pane.unwrap_or(ComparisonPane::CurrentMonth);
    let tabs = Tabs::new(titles)
        .select(match pane {
            ComparisonPane::CurrentMonth => 0,
            ComparisonPane::Comparison => 1,
            ComparisonPane::Recommendations => 2,
        })
        .block(Block::default().borders(Borders::ALL).title("←/→ to switch"))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(tabs, rows[0]);

    match pane {
        ComparisonPane::CurrentMonth => draw_current_month(f, rows[1], app),
        ComparisonPane::Comparison => draw_month_comparison(f, rows[1], app),
        ComparisonPane::Recommendations => draw_recommendations(f, rows[1], app),
    }
}

fn draw_current_month(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let month = &app.comparisons.months[0];
    let data: Vec<(&str, u64)> = month.categories.iter().map(|c| (c.name, c.amount)).collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Current Month Breakdown — {}", month.month)),
        )
        .bar_width(9)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Blue))
        .value_style(Style::default().add_modifier(Modifier::BOLD))
        .data(&data);
    f.render_widget(chart, cols[0]);

    let savings_rate = month.savings as f64 / month.total_income.max(1) as f64 * 100.0;
    let summary = Paragraph::new(format!(
        "Total Income  : ${}\nTotal Expenses: ${}\nSavings       : ${}\nSavings Rate  : {:.1}%",
        fmt_amount(month.total_income),
        fmt_amount(month.total_expenses),
        fmt_amount(month.savings),
        savings_rate
    ))
    .block(Block::default().borders(Borders::ALL).title("Monthly Summary"));
    f.render_widget(summary, cols[1]);
}

fn draw_month_comparison(f: &mut Frame, area: Rect, app: &App) {
    let months = &app.comparisons.months;
    let selected = months
        .get(app.comparisons.selected_month)
        .map(|m| m.month)
        .unwrap_or("-");

    // One group per month, one bar per priority tier.
    let tier_styles = [
        ("P1 Essentials", Color::Blue),
        ("P2 Lifestyle", Color::Magenta),
        ("P3 Savings", Color::Green),
    ];
    let mut chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Monthly Comparison — selected: {selected}  (m=cycle month)"
        )))
        .bar_width(13)
        .bar_gap(1)
        .group_gap(3);
    for month in months {
        let bars: Vec<Bar> = tier_styles
            .iter()
            .enumerate()
            .map(|(i, (label, color))| {
                Bar::default()
                    .value(month.tier_total(i as u8 + 1))
                    .label(Line::from(*label))
                    .style(Style::default().fg(*color))
            })
            .collect();
        chart = chart.data(BarGroup::default().label(Line::from(month.month)).bars(&bars));
    }
    f.render_widget(chart, area);
}

fn draw_recommendations(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .comparisons
        .recommendations
        .iter()
        .map(|rec| {
            let color = match rec.severity {
                Severity::High => Color::Red,
                Severity::Medium => Color::Yellow,
                Severity::Low => Color::Green,
            };
            ListItem::new(vec![
                Line::from(Span::styled(
                    rec.title,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
                Line::from(rec.description),
                Line::from(Span::styled(format!("→ {}", rec.action), Style::default().fg(color))),
                Line::from(""),
            ])
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Recommendations"));
    f.render_widget(list, area);
}

// Profile Page

fn draw_profile(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Profile  (e=edit, w=password, l=login, o=logout, r=refresh)");

    if app.profile.loading {
        f.render_widget(Paragraph::new("Loading profile…").block(block), area);
        return;
    }

    let Some(profile) = &app.profile.profile else {
        let mut lines = vec![Line::from("Please log in to view your profile.")];
        if let Some(err) = &app.profile.error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                err.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        f.render_widget(Paragraph::new(lines).block(block), area);
        return;
    };

    let user = app.profile.user.as_ref();
    let opt_num = |v: Option<&rust_decimal::Decimal>| {
        v.map(fmt_money).unwrap_or_else(|| "-".into())
    };
    let mut lines = vec![
        Line::from(format!("Username       : {}", profile.username)),
        Line::from(format!("Email          : {}", profile.email)),
        Line::from(format!(
            "Age            : {}",
            user.and_then(|u| u.age)
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".into())
        )),
        Line::from(format!(
            "Gender         : {}",
            user.and_then(|u| u.gender.clone()).unwrap_or_else(|| "-".into())
        )),
        Line::from(format!(
            "Monthly Income : {}",
            opt_num(user.and_then(|u| u.monthly_income.as_ref()))
        )),
        Line::from(format!(
            "Total Savings  : {}",
            opt_num(user.and_then(|u| u.total_savings.as_ref()))
        )),
    ];

    if app.profile.editing {
        let form = &app.profile.form;
        let marker = |i: usize| if form.focus == i { "  <editing>" } else { "" };
        lines = vec![
            Line::from(format!("Username       : {}", profile.username)),
            Line::from(format!("Email          : {}", profile.email)),
            Line::from(format!("Age            : {}{}", form.age.rendered(), marker(0))),
            Line::from(format!("Gender         : {}{}", form.gender.rendered(), marker(1))),
            Line::from(format!(
                "Monthly Income : {}{}",
                form.monthly_income.rendered(),
                marker(2)
            )),
            Line::from(format!(
                "Total Savings  : {}{}",
                form.total_savings.rendered(),
                marker(3)
            )),
            Line::from(""),
            Line::from("TAB: switch field | Enter: save | Esc: cancel"),
        ];
        if let Some(err) = &form.error {
            lines.push(Line::from(Span::styled(
                err.clone(),
                Style::default().fg(Color::Red),
            )));
        }
    } else if let Some(err) = &app.profile.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_password_modal(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.profile.password_form;
    let marker = |i: usize| if form.focus == i { "  <editing>" } else { "" };
    let lines = vec![
        format!("New Password     : {}{}", form.new_password.rendered(), marker(0)),
        format!("Confirm Password : {}{}", form.confirm.rendered(), marker(1)),
        "".into(),
        "TAB: switch field | Enter: save | Esc: cancel".into(),
        form.error.clone().unwrap_or_default(),
    ]
    .join("\n");
    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Change Password"));
    f.render_widget(p, area);
}

fn draw_login_modal(f: &mut Frame, area: Rect, app: &App) {
    let form = &app.profile.login_form;
    let title = if form.registering { "Register" } else { "Log In" };
    let mut lines = Vec::new();
    if form.registering {
        let marker = |i: usize| if form.focus == i { "  <editing>" } else { "" };
        lines.push(format!("Username : {}{}", form.username.rendered(), marker(0)));
        lines.push(format!("Email    : {}{}", form.email.rendered(), marker(1)));
        lines.push(format!("Password : {}{}", form.password.rendered(), marker(2)));
    } else {
        let marker = |i: usize| if form.focus == i { "  <editing>" } else { "" };
        lines.push(format!("Email    : {}{}", form.email.rendered(), marker(0)));
        lines.push(format!("Password : {}{}", form.password.rendered(), marker(1)));
    }
    lines.push("".into());
    lines.push("TAB: switch field | Enter: submit | Esc: cancel".into());
    lines.push(format!(
        "Ctrl+r: switch to {}",
        if form.registering { "log in" } else { "register" }
    ));
    lines.push(form.error.clone().unwrap_or_default());

    let p = Paragraph::new(lines.join("\n"))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help_text = vec![
        "Global Keys:",
        "  q        : Quit App",
        "  Tab      : Next view",
        "  1-4      : Jump to Dashboard / Rules / Comparisons / Profile",
        "  ? or 5   : This Help view",
        "",
        "Dashboard:",
        "  Up/Down  : Navigate categories",
        "  + / -    : Adjust spending by 1000 (clamped to the budget)",
        "  p        : Toggle Paid/Not Paid (priority 1 categories)",
        "  n        : Add a category",
        "",
        "Rules:",
        "  Up/Down  : Navigate rules",
        "  Enter    : Select the highlighted rule",
        "  n        : Create a custom rule (allocations must total 100%)",
        "",
        "Comparisons:",
        "  ←/→      : Switch between breakdown, comparison, recommendations",
        "  m        : Cycle the selected month",
        "",
        "Profile:",
        "  e        : Edit profile fields",
        "  w        : Change password",
        "  l        : Log in / register",
        "  o        : Log out",
        "  r        : Refresh from the server",
    ]
    .join("\n");

    let p = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Help & Keybindings"));
    f.render_widget(p, area);
}

fn center_rect(rect: Rect, w: u16, h: u16) -> Rect {
    let x = rect.x + rect.width.saturating_sub(w) / 2;
    let y = rect.y + rect.height.saturating_sub(h) / 2;
    Rect {
        x,
        y,
        width: w.min(rect.width),
        height: h.min(rect.height),
    }
}
