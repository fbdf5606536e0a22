use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph, Sparkline, Tabs},
    Frame, Terminal,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::io;

use crate::error::TrackerError;
use crate::models::Transaction;
use crate::tracker::{BudgetStatus, CategoryTotal, ExpenseManager, MonthlyTotal};
use crate::ui::theme;
use crate::ui::util::{format_amount, format_percent, truncate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tab {
    Categories,
    Monthly,
    Balance,
    Budgets,
}

impl Tab {
    pub(crate) fn all() -> &'static [Tab] {
        &[Self::Categories, Self::Monthly, Self::Balance, Self::Budgets]
    }

    pub(crate) fn title(&self) -> &'static str {
        match self {
            Self::Categories => "By Category",
            Self::Monthly => "Income vs Expenses",
            Self::Balance => "Balance",
            Self::Budgets => "Budgets",
        }
    }

    fn index(&self) -> usize {
        Self::all().iter().position(|t| t == self).unwrap_or(0)
    }

    pub(crate) fn next(&self) -> Tab {
        let tabs = Self::all();
        tabs[(self.index() + 1) % tabs.len()]
    }

    pub(crate) fn prev(&self) -> Tab {
        let tabs = Self::all();
        tabs[(self.index() + tabs.len() - 1) % tabs.len()]
    }
}

/// Everything the viewer draws, loaded once before the terminal is taken over.
pub(crate) struct ChartData {
    pub(crate) categories: Vec<CategoryTotal>,
    pub(crate) monthly: Vec<MonthlyTotal>,
    pub(crate) balance: Vec<(NaiveDate, Decimal)>,
    pub(crate) budgets: Vec<BudgetStatus>,
}

impl ChartData {
    pub(crate) fn load(em: &ExpenseManager) -> crate::error::Result<Self> {
        Ok(Self {
            categories: em.category_summary()?,
            monthly: em.monthly_summary()?,
            balance: cumulative_balance(&em.all_transactions()?)?,
            budgets: em.budget_status()?,
        })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.monthly.is_empty() && self.budgets.is_empty()
    }
}

/// Running balance at the end of each day that has transactions, oldest first.
pub(crate) fn cumulative_balance(
    transactions: &[Transaction],
) -> crate::error::Result<Vec<(NaiveDate, Decimal)>> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|t| (t.date, t.id));

    let mut points: Vec<(NaiveDate, Decimal)> = Vec::new();
    let mut running = Decimal::ZERO;
    for txn in ordered {
        running = running
            .checked_add(txn.signed_amount())
            .ok_or(TrackerError::Overflow("running balance"))?;
        match points.last_mut() {
            Some((date, value)) if *date == txn.date => *value = running,
            _ => points.push((txn.date, running)),
        }
    }
    Ok(points)
}

/// Sparklines only take unsigned values, so the series is shifted up until
/// its lowest point sits at zero.
pub(crate) fn sparkline_points(series: &[(NaiveDate, Decimal)]) -> Vec<u64> {
    let floor = series
        .iter()
        .map(|(_, v)| *v)
        .min()
        .unwrap_or(Decimal::ZERO)
        .min(Decimal::ZERO);
    series
        .iter()
        .map(|(_, v)| v.saturating_sub(floor).round().to_u64().unwrap_or(u64::MAX))
        .collect()
}

// ── Terminal ──────────────────────────────────────────────────

pub(crate) fn show(data: &ChartData) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_viewer(&mut terminal, data);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_viewer(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, data: &ChartData) -> Result<()> {
    let mut tab = Tab::Categories;
    loop {
        terminal.draw(|f| render(f, tab, data))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => tab = tab.next(),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => tab = tab.prev(),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                tab = Tab::all()[idx];
            }
            _ => {}
        }
    }
}

// ── Rendering ─────────────────────────────────────────────────

fn render(f: &mut Frame, tab: Tab, data: &ChartData) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tabs
            Constraint::Min(5),    // chart
            Constraint::Length(1), // key hints
        ])
        .split(f.area());

    let titles: Vec<Line> = Tab::all()
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!(" {} {} ", i + 1, t.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(tab.index())
        .style(theme::dim_style())
        .highlight_style(theme::selected_tab_style())
        .divider("");
    f.render_widget(tabs, chunks[0]);

    match tab {
        Tab::Categories => render_categories(f, chunks[1], &data.categories),
        Tab::Monthly => render_monthly(f, chunks[1], &data.monthly),
        Tab::Balance => render_balance(f, chunks[1], &data.balance),
        Tab::Budgets => render_budgets(f, chunks[1], &data.budgets),
    }

    let hints = Paragraph::new(" Tab/←→ switch chart · 1-4 jump · q quit")
        .style(theme::status_bar_style());
    f.render_widget(hints, chunks[2]);
}

fn chart_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(format!(" {title} "), theme::title_style()))
}

fn render_empty(f: &mut Frame, area: Rect, title: &str, message: &str) {
    let msg = Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        theme::dim_style(),
    )))
    .centered()
    .block(chart_block(title));
    f.render_widget(msg, area);
}

fn whole_units(amount: Decimal) -> u64 {
    amount.abs().round().to_u64().unwrap_or(0)
}

fn render_categories(f: &mut Frame, area: Rect, categories: &[CategoryTotal]) {
    let title = "Expenses by Category";
    if categories.is_empty() {
        render_empty(f, area, title, "No expenses recorded yet.");
        return;
    }

    let bars: Vec<Bar> = categories
        .iter()
        .map(|c| {
            Bar::default()
                .value(whole_units(c.amount))
                .text_value(format_amount(c.amount))
                .label(Line::from(truncate(&c.category, 12)))
                .style(Style::default().fg(theme::ACCENT))
        })
        .collect();

    let chart = BarChart::default()
        .block(chart_block(title))
        .data(BarGroup::default().bars(&bars))
        .bar_width(12)
        .bar_gap(2)
        .value_style(
            Style::default()
                .fg(theme::HEADER_BG)
                .bg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(chart, area);
}

fn render_monthly(f: &mut Frame, area: Rect, monthly: &[MonthlyTotal]) {
    let title = "Income (green) vs Expenses (red) per Month";
    if monthly.is_empty() {
        render_empty(f, area, title, "No transactions recorded yet.");
        return;
    }

    let mut chart = BarChart::default()
        .block(chart_block(title))
        .bar_width(9)
        .bar_gap(1)
        .group_gap(3);
    for month in monthly {
        let bars = [
            Bar::default()
                .value(whole_units(month.income))
                .text_value(format_amount(month.income))
                .style(Style::default().fg(theme::GREEN)),
            Bar::default()
                .value(whole_units(month.expenses))
                .text_value(format_amount(month.expenses))
                .style(Style::default().fg(theme::RED)),
        ];
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(month.month.clone()))
                .bars(&bars),
        );
    }
    f.render_widget(chart, area);
}

fn render_balance(f: &mut Frame, area: Rect, balance: &[(NaiveDate, Decimal)]) {
    let Some(((first, _), (last, current))) = balance.first().zip(balance.last()) else {
        render_empty(f, area, "Balance Over Time", "No transactions recorded yet.");
        return;
    };

    let title = format!(
        "Balance {first} → {last}: {}",
        format_amount(*current)
    );
    let data = sparkline_points(balance);
    let color = if *current >= Decimal::ZERO {
        theme::GREEN
    } else {
        theme::RED
    };
    let sparkline = Sparkline::default()
        .block(chart_block(&title))
        .data(&data)
        .style(Style::default().fg(color));
    f.render_widget(sparkline, area);
}

fn render_budgets(f: &mut Frame, area: Rect, budgets: &[BudgetStatus]) {
    let title = "Budget vs Spent";
    if budgets.is_empty() {
        render_empty(f, area, title, "No budgets set. Use set-budget <category> <amount>.");
        return;
    }

    let outer = chart_block(title);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            budgets
                .iter()
                .map(|_| Constraint::Length(3))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .split(inner);

    for (status, row) in budgets.iter().zip(rows.iter()) {
        let ratio = (status.percentage / Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        let label = format!(
            "{} of {} ({})",
            format_amount(status.spent),
            format_amount(status.budget),
            format_percent(status.percentage)
        );
        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme::OVERLAY))
                    .title(Span::styled(status.category.clone(), theme::title_style())),
            )
            .gauge_style(Style::default().fg(theme::usage_color(status.percentage)).bg(theme::SURFACE))
            .ratio(ratio)
            .label(Span::styled(label, Style::default().fg(theme::TEXT)));
        f.render_widget(gauge, *row);
    }
}
