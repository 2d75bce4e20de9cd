use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Gauge, Paragraph};

use hankey::app::{App, open_source};
use hankey::config::Config;
use hankey::event::{AppEvent, EventHandler, is_quit, key_name};
use hankey::hangul::{decompose, typing_hint};
use hankey::keyboard::layout::{KeyboardLayout, key_binding};
use hankey::session::drill::DrillPhase;
use hankey::session::input::KeyOutcome;
use hankey::store::json_store::{JsonStore, ProgressStore};
use hankey::ui::components::curriculum_menu::{self, CurriculumMenu};
use hankey::ui::components::drill_summary::{DrillSummary, summary_hints};
use hankey::ui::components::keyboard_diagram::{self, KeyboardDiagram};
use hankey::ui::components::word_card::WordCard;
use hankey::ui::layout::{AppLayout, centered_rect, show_keyboard};
use hankey::ui::theme::Theme;
use hankey::words::pack::{PackDirSource, PackRequest};
use hankey::words::table::TableSource;

#[derive(Parser)]
#[command(name = "hankey", version, about = "Korean two-set keyboard typing drills")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(short, long, global = true, help = "Curriculum id to open on start")]
    curriculum: Option<String>,

    #[arg(long, global = true, help = "JSON word table to practice from")]
    word_table: Option<String>,

    #[arg(long, global = true, help = "Pack server base URL")]
    remote_url: Option<String>,

    #[arg(long, global = true, help = "Directory holding word packs")]
    pack_dir: Option<String>,

    #[arg(long, global = true, help = "Pause after each finished word (ms)")]
    advance_delay_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive typing drill (default)
    Practice,
    /// Print the keystroke units and keys for some text
    Decompose { text: Vec<String> },
    /// List the available curriculums
    Curriculums,
    /// List the words of one level in the word table, with their keys
    Level { level: String },
    /// Build a word pack from a JSON request and save it to the pack directory
    BuildPack { request: PathBuf },
    /// Remove a pack from the pack directory
    DeletePack { pack_id: String },
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(ref id) = cli.curriculum {
        config.default_curriculum = Some(id.clone());
    }
    if let Some(ref path) = cli.word_table {
        config.word_table = Some(path.clone());
    }
    if let Some(ref url) = cli.remote_url {
        config.remote_url = Some(url.clone());
    }
    if let Some(ref dir) = cli.pack_dir {
        config.pack_dir = dir.clone();
    }
    if let Some(ms) = cli.advance_delay_ms {
        config.advance_delay_ms = ms;
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        log::warn!("using default config: {e:#}");
        Config::default()
    });
    // Write the defaults out once so there is a file to edit.
    if !Config::config_path().exists()
        && let Err(e) = config.save()
    {
        log::warn!("could not write {}: {e:#}", Config::config_path().display());
    }
    apply_overrides(&mut config, &cli);
    config.validate();

    match cli.command.unwrap_or(Command::Practice) {
        Command::Practice => practice(config),
        Command::Decompose { text } => {
            print_decomposition(&text.join(" "));
            Ok(())
        }
        Command::Curriculums => list_curriculums(config),
        Command::Level { level } => list_level(&config, &level),
        Command::BuildPack { request } => build_pack(&config, &request),
        Command::DeletePack { pack_id } => {
            PackDirSource::new(config.pack_dir.as_str()).delete_pack(&pack_id)?;
            println!("deleted pack {pack_id}");
            Ok(())
        }
    }
}

fn print_decomposition(text: &str) {
    println!("{text} -> {}", typing_hint(text));
    for unit in decompose(text) {
        let key = key_binding(unit).unwrap_or("?");
        let shown = if unit == ' ' { "␣".to_string() } else { unit.to_string() };
        println!("  {shown}  {key}");
    }
}

fn list_curriculums(config: Config) -> Result<()> {
    let source = open_source(&config)?;
    let store = JsonStore::new()
        .ok()
        .map(|s| Box::new(s) as Box<dyn ProgressStore>);
    let app = App::with_source(config, source, store);
    if app.curriculums().is_empty() {
        println!("no curriculums found");
    }
    for curriculum in app.curriculums() {
        let done = if app.is_completed(&curriculum.id) { " ✓" } else { "" };
        println!(
            "{}\t{} {}{done}\t{}",
            curriculum.id, curriculum.icon, curriculum.name, curriculum.description
        );
    }
    Ok(())
}

fn list_level(config: &Config, level: &str) -> Result<()> {
    let table = match config.word_table {
        Some(ref path) => TableSource::from_path(Path::new(path))?,
        None => TableSource::builtin()?,
    };
    let words = table.words_for_level(level);
    if words.is_empty() {
        println!("no words at level {level}");
    }
    for word in words {
        println!("{}\t{}\t{}", word.text, typing_hint(&word.text), word.translation);
    }
    Ok(())
}

fn build_pack(config: &Config, request_path: &Path) -> Result<()> {
    let content = fs::read_to_string(request_path)
        .with_context(|| format!("reading {}", request_path.display()))?;
    let request: PackRequest =
        serde_json::from_str(&content).context("pack request is not valid JSON")?;
    let packs = PackDirSource::new(config.pack_dir.as_str());
    let pack = packs.create_pack(&request)?;
    println!(
        "saved pack {} ({} items) to {}",
        pack.pack_id,
        pack.items.len(),
        packs.dir().display()
    );
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Screen {
    Select,
    Drill,
    Summary,
}

struct Tui {
    app: App,
    screen: Screen,
    selected: usize,
    completed: Vec<bool>,
    theme: Theme,
    layout: KeyboardLayout,
    flash_until: Option<Instant>,
    advance_until: Option<Instant>,
    finished_word: Option<String>,
    status: Option<String>,
    should_quit: bool,
}

impl Tui {
    fn new(app: App, theme: Theme) -> Self {
        let mut tui = Self {
            app,
            screen: Screen::Select,
            selected: 0,
            completed: Vec::new(),
            theme,
            layout: KeyboardLayout::default(),
            flash_until: None,
            advance_until: None,
            finished_word: None,
            status: None,
            should_quit: false,
        };
        tui.refresh_catalog();
        tui
    }

    fn refresh_catalog(&mut self) {
        self.app.load_curriculums();
        let completed: Vec<bool> = self
            .app
            .curriculums()
            .iter()
            .map(|c| self.app.is_completed(&c.id))
            .collect();
        self.completed = completed;
        self.selected = self.selected.min(self.completed.len().saturating_sub(1));
    }

    fn open(&mut self, id: &str) {
        self.clear_timers();
        if self.app.select_curriculum(id) {
            self.screen = Screen::Drill;
            self.status = None;
        } else {
            self.app.change_curriculum();
            self.screen = Screen::Select;
            self.status = Some(format!("No words to practice in {id}"));
        }
    }

    fn back_to_select(&mut self) {
        self.clear_timers();
        self.app.change_curriculum();
        self.screen = Screen::Select;
        self.refresh_catalog();
    }

    fn clear_timers(&mut self) {
        self.flash_until = None;
        self.advance_until = None;
        self.finished_word = None;
    }

    fn on_tick(&mut self) {
        self.expire_timers(Instant::now());
    }

    fn expire_timers(&mut self, now: Instant) {
        if self.flash_until.is_some_and(|t| now >= t) {
            self.flash_until = None;
        }
        if self.advance_until.is_some_and(|t| now >= t) {
            self.advance_until = None;
            self.finished_word = None;
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if is_quit(&key) {
            self.should_quit = true;
            return;
        }
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.screen {
            Screen::Select => self.handle_select_key(key),
            Screen::Drill => self.handle_drill_key(key),
            Screen::Summary => self.handle_summary_key(key),
        }
    }

    fn handle_select_key(&mut self, key: KeyEvent) {
        let len = self.app.curriculums().len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = curriculum_menu::step(self.selected, len, false)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = curriculum_menu::step(self.selected, len, true)
            }
            KeyCode::Enter => {
                if let Some(id) = self.app.curriculums().get(self.selected).map(|c| c.id.clone()) {
                    self.open(&id);
                }
            }
            _ => {}
        }
    }

    fn handle_drill_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.back_to_select();
            return;
        }
        // Input is dropped while the finished word is still on screen.
        self.expire_timers(Instant::now());
        if self.advance_until.is_some() {
            return;
        }
        let Some(name) = key_name(&key) else {
            return;
        };
        let Some(event) = self.app.handle_key(&name) else {
            return;
        };

        let now = Instant::now();
        self.flash_until = None;
        match event.outcome {
            KeyOutcome::Incorrect => {
                self.flash_until = Some(now + Duration::from_millis(self.app.config.error_flash_ms));
            }
            KeyOutcome::WordComplete { word, .. } => {
                if self.app.config.advance_delay_ms > 0 {
                    self.advance_until =
                        Some(now + Duration::from_millis(self.app.config.advance_delay_ms));
                    self.finished_word = Some(word);
                }
            }
            KeyOutcome::DrillComplete { .. } => self.screen = Screen::Summary,
            KeyOutcome::Correct => {}
        }
    }

    fn handle_summary_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if let Some(next) = self.app.next_curriculum().map(|c| c.id.clone()) {
                    self.open(&next);
                }
            }
            KeyCode::Char('m') => {
                if self.app.retry_mistakes() {
                    self.clear_timers();
                    self.screen = Screen::Drill;
                }
            }
            KeyCode::Char('r') => {
                self.clear_timers();
                self.app.restart();
                self.screen = Screen::Drill;
            }
            KeyCode::Char('c') | KeyCode::Esc => self.back_to_select(),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }
}

fn practice(config: Config) -> Result<()> {
    let start_with = config.default_curriculum.clone();
    let app = App::new(config)?;
    let theme = Theme::load_user().unwrap_or_default();
    let mut tui = Tui::new(app, theme);
    if let Some(id) = start_with {
        tui.open(&id);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let keyboard_enhanced = execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(50));

    let result = run_tui(&mut terminal, &mut tui, &events);

    if keyboard_enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_tui(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    tui: &mut Tui,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, tui))?;

        match events.next()? {
            AppEvent::Key(key) => tui.handle_key(key),
            AppEvent::Tick => tui.on_tick(),
        }

        if tui.should_quit {
            return Ok(());
        }
    }
}

fn render(frame: &mut ratatui::Frame, tui: &Tui) {
    let area = frame.area();
    let colors = &tui.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            header_text(tui),
            Style::default()
                .fg(colors.header_fg())
                .add_modifier(Modifier::BOLD),
        )))
        .style(Style::default().bg(colors.header_bg())),
        layout.header,
    );

    let footer = match tui.screen {
        Screen::Select => match tui.status {
            Some(ref status) => format!(" {status}"),
            None => " [↑↓] Choose  [Enter] Start  [q] Quit".to_string(),
        },
        Screen::Drill => " [Esc] Curriculums  [Ctrl-C] Quit".to_string(),
        Screen::Summary => tui
            .app
            .last_result
            .as_ref()
            .map(|r| summary_hints(r, tui.app.next_curriculum().is_some()))
            .unwrap_or_default(),
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            footer,
            Style::default().fg(colors.jamo_pending()),
        ))),
        layout.footer,
    );

    match tui.screen {
        Screen::Select => {
            let menu = CurriculumMenu::new(tui.app.curriculums(), tui.selected, &tui.theme)
                .completed(tui.completed.clone())
                .student(&tui.app.config.student);
            frame.render_widget(menu, layout.main);
        }
        Screen::Drill => render_drill(frame, tui, layout.main),
        Screen::Summary => {
            if let Some(ref result) = tui.app.last_result {
                let next = tui.app.next_curriculum().map(|c| c.name.as_str());
                let summary = DrillSummary::new(result, next, &tui.theme);
                frame.render_widget(summary, centered_rect(60, 70, layout.main));
            }
        }
    }
}

fn header_text(tui: &Tui) -> String {
    let Some(ref curriculum) = tui.app.curriculum else {
        return " hankey".to_string();
    };
    let drill = &tui.app.drill;
    if drill.phase() == DrillPhase::NotReady {
        return format!(" {} {}", curriculum.icon, curriculum.name);
    }
    let retry = if drill.is_retry { " (retry)" } else { "" };
    let position = (drill.word_index + 1).min(drill.words.len());
    format!(
        " {} {}{retry} | Word {position}/{} | Acc {:.1}% | Mistakes {}",
        curriculum.icon,
        curriculum.name,
        drill.words.len(),
        drill.accuracy() * 100.0,
        drill.mistake_words.len()
    )
}

fn render_drill(frame: &mut ratatui::Frame, tui: &Tui, area: ratatui::layout::Rect) {
    let colors = &tui.theme.colors;
    let drill = &tui.app.drill;

    let show_kbd = show_keyboard(area);
    let mut constraints = vec![Constraint::Min(8), Constraint::Length(3)];
    if show_kbd {
        constraints.push(Constraint::Length(keyboard_diagram::HEIGHT));
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let card = WordCard::new(drill, &tui.theme)
        .flash_error(tui.flash_until.is_some())
        .finished(tui.finished_word.as_deref());
    frame.render_widget(card, rows[0]);

    let gauge = Gauge::default()
        .block(
            Block::bordered()
                .title(" Progress ")
                .border_style(Style::default().fg(colors.border())),
        )
        .gauge_style(Style::default().fg(colors.bar_filled()).bg(colors.bg()))
        .ratio(drill.progress().clamp(0.0, 1.0));
    frame.render_widget(gauge, rows[1]);

    if show_kbd {
        let next = if tui.finished_word.is_some() {
            None
        } else {
            drill.expected_key()
        };
        frame.render_widget(KeyboardDiagram::new(&tui.layout, next, &tui.theme), rows[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::parse_from([
            "hankey",
            "--curriculum",
            "W1-2",
            "--advance-delay-ms",
            "0",
            "decompose",
            "학교",
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, &cli);
        assert_eq!(config.default_curriculum.as_deref(), Some("W1-2"));
        assert_eq!(config.advance_delay_ms, 0);
        assert!(config.remote_url.is_none());
        assert!(matches!(cli.command, Some(Command::Decompose { ref text }) if text == &["학교"]));
    }

    fn drilling_tui() -> Tui {
        let table = r#"[
            {"korean": "짐", "curriculum": "c1"},
            {"korean": "값", "curriculum": "c1"}
        ]"#;
        let source = TableSource::from_json(table).unwrap();
        let app = App::with_source(Config::default(), Box::new(source), None);
        let mut tui = Tui::new(app, Theme::default());
        tui.open("c1");
        assert_eq!(tui.screen, Screen::Drill);
        tui
    }

    fn press(tui: &mut Tui, ch: char) {
        tui.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
    }

    #[test]
    fn test_keys_inside_advance_window_are_dropped() {
        let mut tui = drilling_tui();
        tui.advance_until = Some(Instant::now() + Duration::from_secs(60));
        press(&mut tui, 'w');
        assert_eq!(tui.app.drill.stats.total_attempts, 0);
    }

    #[test]
    fn test_expired_advance_window_accepts_keys_without_tick() {
        let mut tui = drilling_tui();
        tui.advance_until = Some(Instant::now());
        tui.finished_word = Some("짐".to_string());
        tui.flash_until = Some(Instant::now());
        press(&mut tui, 'w');
        assert!(tui.advance_until.is_none());
        assert!(tui.finished_word.is_none());
        assert!(tui.flash_until.is_none());
        assert_eq!(tui.app.drill.stats.total_attempts, 1);
        assert_eq!(tui.app.drill.jamo_index, 1);
    }

    #[test]
    fn test_level_and_delete_pack_commands_parse() {
        let cli = Cli::parse_from(["hankey", "level", "beginner1"]);
        assert!(matches!(cli.command, Some(Command::Level { ref level }) if level == "beginner1"));

        let cli = Cli::parse_from(["hankey", "--pack-dir", "/tmp/p", "delete-pack", "b1_travel"]);
        assert!(matches!(cli.command, Some(Command::DeletePack { ref pack_id }) if pack_id == "b1_travel"));
        assert_eq!(cli.pack_dir.as_deref(), Some("/tmp/p"));
    }

    #[test]
    fn test_no_subcommand_means_practice() {
        let cli = Cli::parse_from(["hankey"]);
        assert!(cli.command.is_none());
    }
}
