// src/cli/state.rs
use std::time::Instant;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::widgets::ListState;
use rust_decimal::Decimal;

use crate::cli::api::Client;
use crate::cli::input::LineEdit;
use crate::cli::util::parse_money;
use crate::store::{Profile, User, UserUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Rules,
    Comparisons,
    Profile,
    Help,
}

// ============= Dashboard (client-local categories) =============

/// The dashboard keeps its own category list and mutates it optimistically;
/// it never round-trips through the backend.
#[derive(Debug, Clone)]
pub struct LocalCategory {
    pub id: String,
    pub name: String,
    pub priority: u8,
    pub budget: Decimal,
    pub spent: Decimal,
    pub is_paid: Option<bool>,
}

fn seed_categories() -> Vec<LocalCategory> {
    vec![
        LocalCategory {
            id: "1".into(),
            name: "Rent".into(),
            priority: 1,
            budget: Decimal::from(11000),
            spent: Decimal::ZERO,
            is_paid: Some(false),
        },
        LocalCategory {
            id: "2".into(),
            name: "Entertainment".into(),
            priority: 2,
            budget: Decimal::from(11000),
            spent: Decimal::from(6000),
            is_paid: None,
        },
    ]
}

#[derive(Default, Clone)]
pub struct CategoryForm {
    pub name: LineEdit,
    pub priority: u8,
    pub budget: LineEdit,
    // 0: Name, 1: Priority, 2: Budget
    pub focus: usize,
    pub error: Option<String>,
}

pub struct DashboardPage {
    pub categories: Vec<LocalCategory>,
    pub sel: ListState,
    pub creating: bool,
    pub form: CategoryForm,
    last_id: i64,
}

impl Default for DashboardPage {
    fn default() -> Self {
        let mut sel = ListState::default();
        sel.select(Some(0));
        Self {
            categories: seed_categories(),
            sel,
            creating: false,
            form: CategoryForm::default(),
            last_id: 0,
        }
    }
}

// ============= Rules (client-local list) =============

#[derive(Debug, Clone)]
pub struct LocalRule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub needs: u8,
    pub wants: u8,
    pub savings: u8,
    pub selected: bool,
}

fn seed_rules() -> Vec<LocalRule> {
    vec![
        LocalRule {
            id: "1".into(),
            name: "50/30/20 Rule".into(),
            description:
                "A balanced approach where 50% goes to needs, 30% to wants, and 20% to savings/debt."
                    .into(),
            needs: 50,
            wants: 30,
            savings: 20,
            selected: false,
        },
        LocalRule {
            id: "2".into(),
            name: "Zero-Based Budgeting".into(),
            description:
                "Every dollar has a purpose. Income minus expenses equals zero, giving you maximum control."
                    .into(),
            needs: 0,
            wants: 0,
            savings: 0,
            selected: false,
        },
        LocalRule {
            id: "3".into(),
            name: "80/20 Rule".into(),
            description: "Save 20% first, then use the remaining 80% for all other expenses."
                .into(),
            needs: 0,
            wants: 80,
            savings: 20,
            selected: false,
        },
    ]
}

#[derive(Default, Clone)]
pub struct RuleForm {
    pub name: LineEdit,
    pub description: LineEdit,
    pub needs: LineEdit,
    pub wants: LineEdit,
    pub savings: LineEdit,
    // 0: Name, 1: Description, 2: Needs, 3: Wants, 4: Savings
    pub focus: usize,
    pub error: Option<String>,
}

pub struct RulesPage {
    pub rules: Vec<LocalRule>,
    pub sel: ListState,
    pub creating: bool,
    pub form: RuleForm,
    last_id: i64,
}

impl Default for RulesPage {
    fn default() -> Self {
        let mut sel = ListState::default();
        sel.select(Some(0));
        Self {
            rules: seed_rules(),
            sel,
            creating: false,
            form: RuleForm::default(),
            last_id: 0,
        }
    }
}

// ============= Comparisons (static sample data) =============

#[derive(Debug, Clone)]
pub struct CategorySpend {
    pub name: &'static str,
    pub amount: u64,
    pub percentage: f64,
    pub priority: u8,
}

#[derive(Debug, Clone)]
pub struct MonthlyData {
    pub month: &'static str,
    pub categories: Vec<CategorySpend>,
    pub total_income: u64,
    pub total_expenses: u64,
    pub savings: u64,
}

impl MonthlyData {
    /// Sum of amounts for one priority tier; the bar heights of the
    /// month-over-month chart.
    pub fn tier_total(&self, priority: u8) -> u64 {
        self.categories
            .iter()
            .filter(|c| c.priority == priority)
            .map(|c| c.amount)
            .sum()
    }
}

fn sample_months() -> Vec<MonthlyData> {
    vec![
        MonthlyData {
            month: "March 2024",
            categories: vec![
                CategorySpend { name: "Rent", amount: 1200, percentage: 30.0, priority: 1 },
                CategorySpend { name: "Groceries", amount: 400, percentage: 10.0, priority: 1 },
                CategorySpend { name: "Utilities", amount: 200, percentage: 5.0, priority: 1 },
                CategorySpend { name: "Dining Out", amount: 300, percentage: 7.5, priority: 2 },
                CategorySpend { name: "Entertainment", amount: 200, percentage: 5.0, priority: 2 },
                CategorySpend { name: "Savings", amount: 800, percentage: 20.0, priority: 3 },
            ],
            total_income: 4000,
            total_expenses: 3200,
            savings: 800,
        },
        MonthlyData {
            month: "February 2024",
            categories: vec![
                CategorySpend { name: "Rent", amount: 1200, percentage: 30.0, priority: 1 },
                CategorySpend { name: "Groceries", amount: 450, percentage: 11.25, priority: 1 },
                CategorySpend { name: "Utilities", amount: 180, percentage: 4.5, priority: 1 },
                CategorySpend { name: "Dining Out", amount: 350, percentage: 8.75, priority: 2 },
                CategorySpend { name: "Entertainment", amount: 220, percentage: 5.5, priority: 2 },
                CategorySpend { name: "Savings", amount: 600, percentage: 15.0, priority: 3 },
            ],
            total_income: 4000,
            total_expenses: 3400,
            savings: 600,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub title: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub action: &'static str,
}

fn recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation {
            title: "Reduce Dining Out",
            description:
                "Your dining expenses are 15% above average. Consider cooking at home more often.",
            severity: Severity::High,
            action: "Set a monthly limit",
        },
        Recommendation {
            title: "Increase Savings",
            description:
                "You're saving 18% of your income. Try to reach 20% for better financial security.",
            severity: Severity::Medium,
            action: "Adjust savings goal",
        },
        Recommendation {
            title: "Good Job on Utilities",
            description: "Your utility expenses are well within the recommended range.",
            severity: Severity::Low,
            action: "Keep it up!",
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonPane {
    CurrentMonth,
    Comparison,
    Recommendations,
}

#[derive(Default)]
pub struct ComparisonsPage {
    pub pane: Option<ComparisonPane>,
    pub loading: bool,
    pub opened_at: Option<Instant>,
    pub months: Vec<MonthlyData>,
    pub recommendations: Vec<Recommendation>,
    pub selected_month: usize,
}

// ============= Profile =============

#[derive(Default, Clone)]
pub struct ProfileForm {
    pub age: LineEdit,
    pub gender: LineEdit,
    pub monthly_income: LineEdit,
    pub total_savings: LineEdit,
    // 0: Age, 1: Gender, 2: Monthly income, 3: Total savings
    pub focus: usize,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct PasswordForm {
    pub new_password: LineEdit,
    pub confirm: LineEdit,
    // 0: New, 1: Confirm
    pub focus: usize,
    pub error: Option<String>,
}

impl Default for PasswordForm {
    fn default() -> Self {
        Self {
            new_password: LineEdit::password(),
            confirm: LineEdit::password(),
            focus: 0,
            error: None,
        }
    }
}

#[derive(Clone)]
pub struct LoginForm {
    pub username: LineEdit,
    pub email: LineEdit,
    pub password: LineEdit,
    pub registering: bool,
    // login: 0 email, 1 password; register: 0 username, 1 email, 2 password
    pub focus: usize,
    pub error: Option<String>,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            username: LineEdit::default(),
            email: LineEdit::default(),
            password: LineEdit::password(),
            registering: false,
            focus: 0,
            error: None,
        }
    }
}

#[derive(Default)]
pub struct ProfilePage {
    pub profile: Option<Profile>,
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
    pub editing: bool,
    pub form: ProfileForm,
    pub password_dialog: bool,
    pub password_form: PasswordForm,
    pub login_dialog: bool,
    pub login_form: LoginForm,
}

// ============= App =============

fn mint_local_id(last: &mut i64) -> String {
    let mut id = Utc::now().timestamp_millis();
    if id <= *last {
        id = *last + 1;
    }
    *last = id;
    id.to_string()
}

pub struct App {
    pub api: Client,
    pub tab: Tab,
    pub status: String,
    pub quit: bool,
    pub dashboard: DashboardPage,
    pub rules: RulesPage,
    pub comparisons: ComparisonsPage,
    pub profile: ProfilePage,
}

impl App {
    pub fn new(api: Client) -> Self {
        Self {
            api,
            tab: Tab::Dashboard,
            status: "Tab/1-5: switch view | ? for help | q to quit".into(),
            quit: false,
            dashboard: DashboardPage::default(),
            rules: RulesPage::default(),
            comparisons: ComparisonsPage::default(),
            profile: ProfilePage::default(),
        }
    }

    /// Called every poll interval; finishes the comparisons view's
    /// simulated load once ~1s has passed.
    pub fn tick(&mut self) {
        if self.comparisons.loading {
            let done = self
                .comparisons
                .opened_at
                .map(|t| t.elapsed().as_millis() >= 1000)
                .unwrap_or(true);
            if done {
                self.comparisons.months = sample_months();
                self.comparisons.recommendations = recommendations();
                self.comparisons.selected_month = 0;
                self.comparisons.pane = Some(ComparisonPane::CurrentMonth);
                self.comparisons.loading = false;
            }
        }
    }

    pub async fn handle_key(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        if k.kind != KeyEventKind::Press {
            return Ok(());
        }

        // Modals first; they own the keyboard while open.
        if self.dashboard.creating {
            self.handle_category_form(k);
            return Ok(());
        }
        if self.rules.creating {
            self.handle_rule_form(k);
            return Ok(());
        }
        if self.profile.login_dialog {
            self.handle_login_form(k).await;
            return Ok(());
        }
        if self.profile.password_dialog {
            self.handle_password_form(k).await;
            return Ok(());
        }
        if self.profile.editing {
            self.handle_profile_form(k).await;
            return Ok(());
        }

        match k.code {
            KeyCode::Char('q') => {
                self.quit = true;
                return Ok(());
            }
            KeyCode::Tab => {
                let next = match self.tab {
                    Tab::Dashboard => Tab::Rules,
                    Tab::Rules => Tab::Comparisons,
                    Tab::Comparisons => Tab::Profile,
                    Tab::Profile => Tab::Help,
                    Tab::Help => Tab::Dashboard,
                };
                self.goto_tab(next).await;
                return Ok(());
            }
            KeyCode::Char('1') => {
                self.goto_tab(Tab::Dashboard).await;
                return Ok(());
            }
            KeyCode::Char('2') => {
                self.goto_tab(Tab::Rules).await;
                return Ok(());
            }
            KeyCode::Char('3') => {
                self.goto_tab(Tab::Comparisons).await;
                return Ok(());
            }
            KeyCode::Char('4') => {
                self.goto_tab(Tab::Profile).await;
                return Ok(());
            }
            KeyCode::Char('5') | KeyCode::Char('?') => {
                self.tab = Tab::Help;
                return Ok(());
            }
            _ => {}
        }

        match self.tab {
            Tab::Dashboard => match k.code {
                KeyCode::Up => self.move_category(-1),
                KeyCode::Down => self.move_category(1),
                KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_spend(Decimal::from(1000)),
                KeyCode::Char('-') => self.adjust_spend(Decimal::from(-1000)),
                KeyCode::Char('p') => self.toggle_paid(),
                KeyCode::Char('n') => {
                    self.dashboard.creating = true;
                    self.dashboard.form = CategoryForm {
                        priority: 1,
                        ..Default::default()
                    };
                }
                _ => {}
            },
            Tab::Rules => match k.code {
                KeyCode::Up => self.move_rule(-1),
                KeyCode::Down => self.move_rule(1),
                KeyCode::Enter => self.select_rule(),
                KeyCode::Char('n') => {
                    self.rules.creating = true;
                    self.rules.form = RuleForm::default();
                }
                _ => {}
            },
            Tab::Comparisons => match k.code {
                KeyCode::Left => self.move_pane(-1),
                KeyCode::Right => self.move_pane(1),
                KeyCode::Char('m') => {
                    let n = self.comparisons.months.len();
                    if n > 0 {
                        self.comparisons.selected_month =
                            (self.comparisons.selected_month + 1) % n;
                    }
                }
                _ => {}
            },
            Tab::Profile => match k.code {
                KeyCode::Char('e') => {
                    if self.profile.profile.is_some() {
                        self.start_profile_edit();
                    }
                }
                KeyCode::Char('w') => {
                    if self.profile.profile.is_some() {
                        self.profile.password_dialog = true;
                        self.profile.password_form = PasswordForm::default();
                    }
                }
                KeyCode::Char('l') => {
                    self.profile.login_dialog = true;
                    self.profile.login_form = LoginForm::default();
                }
                KeyCode::Char('o') => {
                    self.api.logout();
                    self.profile.profile = None;
                    self.profile.user = None;
                    self.status = "Logged out.".into();
                }
                KeyCode::Char('r') => self.open_profile().await,
                _ => {}
            },
            Tab::Help => {
                if let KeyCode::Esc | KeyCode::Char('b') = k.code {
                    self.tab = Tab::Dashboard;
                }
            }
        }
        Ok(())
    }

    async fn goto_tab(&mut self, tab: Tab) {
        self.tab = tab;
        match tab {
            Tab::Comparisons => {
                if self.comparisons.months.is_empty() && !self.comparisons.loading {
                    self.comparisons.loading = true;
                    self.comparisons.opened_at = Some(Instant::now());
                }
            }
            Tab::Profile => {
                if self.profile.profile.is_none() && !self.profile.login_dialog {
                    self.open_profile().await;
                }
            }
            _ => {}
        }
    }

    // ============= Dashboard =============

    fn move_category(&mut self, delta: isize) {
        let n = self.dashboard.categories.len();
        if n == 0 {
            self.dashboard.sel.select(None);
            return;
        }
        let cur = self.dashboard.sel.selected().unwrap_or(0) as isize;
        let next = (cur + delta).rem_euclid(n as isize) as usize;
        self.dashboard.sel.select(Some(next));
    }

    fn current_category_mut(&mut self) -> Option<&mut LocalCategory> {
        let idx = self.dashboard.sel.selected()?;
        self.dashboard.categories.get_mut(idx)
    }

    // Spend tracking applies to priority 2/3 categories; the adjustment is
    // clamped to [0, budget].
    fn adjust_spend(&mut self, delta: Decimal) {
        if let Some(cat) = self.current_category_mut() {
            if cat.priority == 1 {
                return;
            }
            cat.spent = (cat.spent + delta).max(Decimal::ZERO).min(cat.budget);
        }
    }

    fn toggle_paid(&mut self) {
        if let Some(cat) = self.current_category_mut() {
            if cat.priority == 1 {
                cat.is_paid = Some(!cat.is_paid.unwrap_or(false));
            }
        }
    }

    fn handle_category_form(&mut self, k: KeyEvent) {
        let form = &mut self.dashboard.form;
        match k.code {
            KeyCode::Esc => {
                self.dashboard.creating = false;
            }
            KeyCode::Tab | KeyCode::Down => form.focus = (form.focus + 1) % 3,
            KeyCode::BackTab | KeyCode::Up => form.focus = (form.focus + 2) % 3,
            KeyCode::Left if form.focus == 1 => {
                form.priority = if form.priority <= 1 { 3 } else { form.priority - 1 };
            }
            KeyCode::Right if form.focus == 1 => {
                form.priority = if form.priority >= 3 { 1 } else { form.priority + 1 };
            }
            KeyCode::Char(c) => match form.focus {
                0 => form.name.push(c),
                2 if c.is_ascii_digit() || c == '.' => form.budget.push(c),
                _ => {}
            },
            KeyCode::Backspace => match form.focus {
                0 => form.name.backspace(),
                2 => form.budget.backspace(),
                _ => {}
            },
            KeyCode::Enter => self.submit_category(),
            _ => {}
        }
    }

    fn submit_category(&mut self) {
        let form = &self.dashboard.form;
        if form.name.is_empty() {
            self.dashboard.form.error = Some("Name is required".into());
            return;
        }
        let budget = match parse_money(&form.budget.value) {
            Some(b) if b > Decimal::ZERO => b,
            _ => {
                self.dashboard.form.error = Some("Budget must be a positive amount".into());
                return;
            }
        };
        let priority = form.priority;
        let name = form.name.value.trim().to_string();
        let id = mint_local_id(&mut self.dashboard.last_id);
        self.dashboard.categories.push(LocalCategory {
            id,
            name,
            priority,
            budget,
            spent: Decimal::ZERO,
            is_paid: (priority == 1).then_some(false),
        });
        self.dashboard.creating = false;
        self.status = "Category added.".into();
    }

    // ============= Rules =============

    fn move_rule(&mut self, delta: isize) {
        let n = self.rules.rules.len();
        if n == 0 {
            self.rules.sel.select(None);
            return;
        }
        let cur = self.rules.sel.selected().unwrap_or(0) as isize;
        let next = (cur + delta).rem_euclid(n as isize) as usize;
        self.rules.sel.select(Some(next));
    }

    fn select_rule(&mut self) {
        if let Some(idx) = self.rules.sel.selected() {
            for (i, rule) in self.rules.rules.iter_mut().enumerate() {
                rule.selected = i == idx;
            }
            if let Some(rule) = self.rules.rules.get(idx) {
                self.status = format!("Rule selected: {}", rule.name);
            }
        }
    }

    pub fn selected_rule_name(&self) -> &str {
        self.rules
            .rules
            .iter()
            .find(|r| r.selected)
            .map(|r| r.name.as_str())
            .unwrap_or("50/30/20")
    }

    fn handle_rule_form(&mut self, k: KeyEvent) {
        let form = &mut self.rules.form;
        match k.code {
            KeyCode::Esc => {
                self.rules.creating = false;
            }
            KeyCode::Tab | KeyCode::Down => form.focus = (form.focus + 1) % 5,
            KeyCode::BackTab | KeyCode::Up => form.focus = (form.focus + 4) % 5,
            KeyCode::Char(c) => {
                let numeric = form.focus >= 2;
                let field = match form.focus {
                    0 => &mut form.name,
                    1 => &mut form.description,
                    2 => &mut form.needs,
                    3 => &mut form.wants,
                    _ => &mut form.savings,
                };
                if !numeric || c.is_ascii_digit() {
                    field.push(c);
                }
            }
            KeyCode::Backspace => {
                let field = match form.focus {
                    0 => &mut form.name,
                    1 => &mut form.description,
                    2 => &mut form.needs,
                    3 => &mut form.wants,
                    _ => &mut form.savings,
                };
                field.backspace();
            }
            KeyCode::Enter => self.submit_rule(),
            _ => {}
        }
    }

    // Validation happens only here, at submit time: the three buckets must
    // add up to exactly 100.
    fn submit_rule(&mut self) {
        let form = &self.rules.form;
        if form.name.is_empty() || form.description.is_empty() {
            self.rules.form.error = Some("Name and description are required".into());
            return;
        }
        let parse = |edit: &LineEdit| edit.value.trim().parse::<u8>().unwrap_or(0);
        let (needs, wants, savings) = (parse(&form.needs), parse(&form.wants), parse(&form.savings));
        if needs as u16 + wants as u16 + savings as u16 != 100 {
            self.rules.form.error = Some("Allocations must total 100%".into());
            return;
        }
        let id = mint_local_id(&mut self.rules.last_id);
        self.rules.rules.push(LocalRule {
            id,
            name: form.name.value.trim().to_string(),
            description: form.description.value.trim().to_string(),
            needs,
            wants,
            savings,
            selected: false,
        });
        self.rules.creating = false;
        self.status = "Rule created.".into();
    }

    // ============= Comparisons =============

    fn move_pane(&mut self, delta: i8) {
        use ComparisonPane::*;
        let order = [CurrentMonth, Comparison, Recommendations];
        let cur = self
            .comparisons
            .pane
            .and_then(|p| order.iter().position(|o| *o == p))
            .unwrap_or(0) as i8;
        let next = (cur + delta).rem_euclid(order.len() as i8) as usize;
        self.comparisons.pane = Some(order[next]);
    }

    // ============= Profile =============

    pub async fn open_profile(&mut self) {
        self.profile.loading = true;
        self.profile.error = None;
        match self.api.get_profile().await {
            Ok(profile) => {
                self.profile.profile = Some(profile);
            }
            Err(e) if e.status == Some(401) => {
                self.profile.profile = None;
                self.profile.login_dialog = true;
                self.profile.login_form = LoginForm::default();
                self.profile.error = Some(e.message);
            }
            Err(e) => {
                self.profile.error = Some(e.message);
            }
        }
        self.profile.loading = false;
    }

    fn start_profile_edit(&mut self) {
        let mut form = ProfileForm::default();
        if let Some(user) = &self.profile.user {
            if let Some(age) = user.age {
                form.age.set(age.to_string());
            }
            if let Some(gender) = &user.gender {
                form.gender.set(gender.clone());
            }
            if let Some(income) = &user.monthly_income {
                form.monthly_income.set(income.to_string());
            }
            if let Some(savings) = &user.total_savings {
                form.total_savings.set(savings.to_string());
            }
        }
        self.profile.form = form;
        self.profile.editing = true;
    }

    async fn handle_profile_form(&mut self, k: KeyEvent) {
        match k.code {
            KeyCode::Esc => {
                self.profile.editing = false;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.profile.form.focus = (self.profile.form.focus + 1) % 4;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.profile.form.focus = (self.profile.form.focus + 3) % 4;
            }
            KeyCode::Char(c) => {
                let form = &mut self.profile.form;
                let numeric = form.focus != 1;
                let field = match form.focus {
                    0 => &mut form.age,
                    1 => &mut form.gender,
                    2 => &mut form.monthly_income,
                    _ => &mut form.total_savings,
                };
                if !numeric || c.is_ascii_digit() || c == '.' {
                    field.push(c);
                }
            }
            KeyCode::Backspace => {
                let form = &mut self.profile.form;
                match form.focus {
                    0 => form.age.backspace(),
                    1 => form.gender.backspace(),
                    2 => form.monthly_income.backspace(),
                    _ => form.total_savings.backspace(),
                }
            }
            KeyCode::Enter => self.save_profile().await,
            _ => {}
        }
    }

    /// Only fields the user actually filled in go into the PUT body.
    async fn save_profile(&mut self) {
        let form = &self.profile.form;
        let patch = UserUpdate {
            age: form.age.value.trim().parse().ok(),
            gender: (!form.gender.is_empty()).then(|| form.gender.value.trim().to_string()),
            monthly_income: parse_money(&form.monthly_income.value),
            total_savings: parse_money(&form.total_savings.value),
            ..Default::default()
        };
        match self.api.update_profile(&patch).await {
            Ok(profile) => {
                if let Some(user) = &mut self.profile.user {
                    user.age = patch.age.or(user.age);
                    user.gender = patch.gender.clone().or(user.gender.take());
                    user.monthly_income = patch.monthly_income.or(user.monthly_income);
                    user.total_savings = patch.total_savings.or(user.total_savings);
                }
                self.profile.profile = Some(profile);
                self.profile.editing = false;
                self.status = "Profile updated.".into();
            }
            Err(e) => {
                self.profile.form.error = Some(e.message);
            }
        }
    }

    async fn handle_password_form(&mut self, k: KeyEvent) {
        match k.code {
            KeyCode::Esc => {
                self.profile.password_dialog = false;
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::BackTab | KeyCode::Up => {
                self.profile.password_form.focus = (self.profile.password_form.focus + 1) % 2;
            }
            KeyCode::Char(c) => {
                let form = &mut self.profile.password_form;
                if form.focus == 0 {
                    form.new_password.push(c);
                } else {
                    form.confirm.push(c);
                }
            }
            KeyCode::Backspace => {
                let form = &mut self.profile.password_form;
                if form.focus == 0 {
                    form.new_password.backspace();
                } else {
                    form.confirm.backspace();
                }
            }
            KeyCode::Enter => self.save_password().await,
            _ => {}
        }
    }

    async fn save_password(&mut self) {
        let form = &self.profile.password_form;
        // Confirm-match is checked here, client-side, before anything is sent.
        if form.new_password.value != form.confirm.value {
            self.profile.password_form.error = Some("New passwords do not match".into());
            return;
        }
        let patch = UserUpdate {
            password: Some(form.new_password.value.clone()),
            ..Default::default()
        };
        match self.api.update_profile(&patch).await {
            Ok(_) => {
                self.profile.password_dialog = false;
                self.status = "Password updated.".into();
            }
            Err(e) => {
                self.profile.password_form.error = Some(e.message);
            }
        }
    }

    async fn handle_login_form(&mut self, k: KeyEvent) {
        let fields = if self.profile.login_form.registering { 3 } else { 2 };
        match k.code {
            KeyCode::Esc => {
                self.profile.login_dialog = false;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.profile.login_form.focus = (self.profile.login_form.focus + 1) % fields;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.profile.login_form.focus =
                    (self.profile.login_form.focus + fields - 1) % fields;
            }
            KeyCode::Char('r') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                let form = &mut self.profile.login_form;
                form.registering = !form.registering;
                form.focus = 0;
                form.error = None;
            }
            KeyCode::Char(c) => {
                let form = &mut self.profile.login_form;
                let field = match (form.registering, form.focus) {
                    (true, 0) => &mut form.username,
                    (true, 1) | (false, 0) => &mut form.email,
                    _ => &mut form.password,
                };
                field.push(c);
            }
            KeyCode::Backspace => {
                let form = &mut self.profile.login_form;
                let field = match (form.registering, form.focus) {
                    (true, 0) => &mut form.username,
                    (true, 1) | (false, 0) => &mut form.email,
                    _ => &mut form.password,
                };
                field.backspace();
            }
            KeyCode::Enter => self.submit_login().await,
            _ => {}
        }
    }

    async fn submit_login(&mut self) {
        let form = self.profile.login_form.clone();
        if form.email.is_empty() || form.password.is_empty() {
            self.profile.login_form.error = Some("Email and password are required".into());
            return;
        }
        let result = if form.registering {
            if form.username.is_empty() {
                self.profile.login_form.error = Some("Username is required".into());
                return;
            }
            self.api
                .register(
                    form.username.value.trim(),
                    form.email.value.trim(),
                    &form.password.value,
                )
                .await
        } else {
            self.api
                .login(form.email.value.trim(), &form.password.value)
                .await
        };

        match result {
            Ok(user) => {
                self.status = format!("Logged in as {}.", user.username);
                self.profile.user = Some(user);
                self.profile.login_dialog = false;
                self.open_profile().await;
            }
            Err(e) => {
                self.profile.login_form.error = Some(e.message);
            }
        }
    }
}
