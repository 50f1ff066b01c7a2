use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use clap::Parser;
use saran_core::{
    config::SuggestionConfig,
    key_event::{Action, InputEvent},
    model::{FieldId, FieldRole, Rect},
    session::{Outcome, Session},
    worker::{FilterResults, FilterWorker},
};
use saran_vocab::VocabularyStore;
use tracing::info;

mod overlay;

use overlay::TerminalOverlay;

/// 演示用的输入框位置与屏幕区域。
const ANCHOR: Rect = Rect::new(120.0, 200.0, 240.0, 22.0);
const SCREEN: Rect = Rect::new(0.0, 0.0, 1280.0, 800.0);

#[derive(Parser, Debug)]
#[command(name = "saran")]
#[command(about = "Typing-suggestion demo: a simulated text field with a terminal overlay")]
struct Args {
    /// Vocabulary file (`role<TAB>value` per line)
    #[arg(long, value_name = "PATH")]
    vocab: Option<PathBuf>,

    /// Suggestion settings (TOML)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Initial field role
    #[arg(long, default_value = "alamat")]
    role: FieldRole,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// REPL 命令。
#[derive(Debug, Clone, PartialEq)]
enum Command {
    /// 普通文本：追加到输入框末尾
    Text(String),
    Field(FieldRole),
    Event(InputEvent),
    Show,
    /// 清空输入框
    Clear,
    Quit,
    Help,
    Invalid(String),
}

fn parse_line(line: &str) -> Command {
    let line = line.trim_end_matches(['\n', '\r']);
    let Some(cmd) = line.strip_prefix(':') else {
        return Command::Text(line.to_owned());
    };
    let mut parts = cmd.split_whitespace();
    let name = parts.next().unwrap_or("");
    let arg = parts.next();
    match (name, arg) {
        ("q" | "quit" | "exit", _) => Command::Quit,
        ("h" | "help", _) => Command::Help,
        ("show", _) => Command::Show,
        ("clear", _) => Command::Clear,
        ("up", _) => Command::Event(InputEvent::MoveUp),
        ("down", _) => Command::Event(InputEvent::MoveDown),
        ("ok", _) => Command::Event(InputEvent::Confirm),
        ("esc", _) => Command::Event(InputEvent::Cancel),
        ("end", _) => Command::Event(InputEvent::EditingEnded),
        ("blur", _) => Command::Event(InputEvent::FocusLost),
        ("click", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => Command::Event(InputEvent::PointerSelect(n - 1)),
            _ => Command::Invalid(format!("invalid row `{n}`")),
        },
        ("field", Some(role)) => match role.parse::<FieldRole>() {
            Ok(role) => Command::Field(role),
            Err(e) => Command::Invalid(e.to_string()),
        },
        _ => Command::Invalid(format!("unknown command `:{cmd}`")),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_tracing(args.verbose);

    let vocab_path = args.vocab.clone().unwrap_or_else(default_vocab_path);
    let store = VocabularyStore::from_path(&vocab_path)
        .with_context(|| format!("loading vocabulary from {}", vocab_path.display()))?;
    let config = match &args.config {
        Some(path) => SuggestionConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SuggestionConfig::default(),
    };
    info!(
        limit = config.limit(),
        policy = ?config.click_policy,
        in_tables = config.enabled_in_tables,
        "suggestion settings"
    );

    let (worker, responses) = FilterWorker::spawn().context("starting filter worker")?;
    let mut session = Session::new(TerminalOverlay::default(), store, config);
    session.set_screen(Some(SCREEN));

    let mut repl = Repl {
        session,
        worker,
        responses,
        next_field: 0,
        role: args.role,
        text: String::new(),
    };
    repl.run(&vocab_path)
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("saran_core=trace,saran_vocab=debug,saran_cli=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn default_vocab_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("asset")
        .join("vocab.tsv")
}

struct Repl {
    session: Session<TerminalOverlay, VocabularyStore>,
    worker: FilterWorker,
    responses: FilterResults,
    next_field: u64,
    role: FieldRole,
    /// 模拟输入框的文本
    text: String,
}

impl Repl {
    fn run(&mut self, vocab_path: &Path) -> Result<()> {
        let mut out = io::stdout();
        let mut line = String::new();
        writeln!(out, "saran demo | vocab: {}", vocab_path.display())?;
        writeln!(out, "输入文本模拟输入框内容；:help 查看命令，:q 退出。")?;
        self.bind(self.role);

        loop {
            line.clear();
            write!(out, "{}> {}", self.role, self.text)?;
            out.flush()?;
            if io::stdin().read_line(&mut line)? == 0 {
                break;
            }
            match parse_line(&line) {
                Command::Quit => break,
                Command::Help => print_help(&mut out)?,
                Command::Show => {
                    for (role, n) in self.session.source().counts() {
                        writeln!(out, "  {role}: {n} words")?;
                    }
                    let config = self.session.controller().config();
                    writeln!(
                        out,
                        "  limit: {}, click: {:?}, tables: {}",
                        config.limit(),
                        config.click_policy,
                        if config.enabled_in_tables { "on" } else { "off" }
                    )?;
                }
                Command::Invalid(msg) => writeln!(out, "  ({msg})")?,
                Command::Field(role) => {
                    self.session.handle(InputEvent::EditingEnded);
                    self.bind(role);
                }
                Command::Clear => {
                    self.text.clear();
                    let outcome = self.session.handle(InputEvent::TextChanged(String::new()));
                    self.apply(&mut out, outcome)?;
                }
                Command::Text(text) => {
                    // 每行是追加输入：模拟用户继续打字
                    self.text.push_str(&text);
                    let outcome = self.session.handle(InputEvent::TextChanged(self.text.clone()));
                    self.apply(&mut out, outcome)?;
                }
                Command::Event(ev) => {
                    let outcome = self.session.handle(ev);
                    if !outcome.consumed {
                        writeln!(out, "  (not handled by suggestions, passed to the field)")?;
                    }
                    self.apply(&mut out, outcome)?;
                }
            }
            if let Some(view) = self.session.controller().overlay().render() {
                writeln!(out, "{view}")?;
            }
        }
        Ok(())
    }

    fn bind(&mut self, role: FieldRole) {
        self.next_field += 1;
        self.role = role;
        self.text.clear();
        self.session.handle(InputEvent::EditingStarted {
            field: FieldId(self.next_field),
            role,
            anchor: ANCHOR,
        });
    }

    /// 执行动作：过滤请求交给 worker 并等待结果；替换写回模拟输入框。
    fn apply(&mut self, out: &mut impl Write, outcome: Outcome) -> Result<()> {
        let mut submitted = 0;
        for action in outcome.actions {
            match action {
                Action::Filter(request) => {
                    self.worker.submit(request);
                    submitted += 1;
                }
                Action::Replace { text, caret, .. } => {
                    writeln!(out, "  commit: {text:?} (caret {caret})")?;
                    self.text = text;
                }
            }
        }
        // 每个未取消的请求恰好产生一个结果
        for _ in 0..submitted {
            let Some(response) = self.responses.blocking_recv() else {
                anyhow::bail!("filter worker stopped");
            };
            self.session.deliver(response);
        }
        Ok(())
    }
}

fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "  <text>        追加到输入框（以空格结尾即结束当前词）")?;
    writeln!(out, "  :field <role> 切换输入框（namaguru/namasiswa/alamat/ttl/mapel/jabatan）")?;
    writeln!(out, "  :up / :down   移动高亮")?;
    writeln!(out, "  :ok           写回高亮候选")?;
    writeln!(out, "  :click <n>    点击第 n 行")?;
    writeln!(out, "  :esc          关闭浮层")?;
    writeln!(out, "  :blur         窗口失去焦点")?;
    writeln!(out, "  :end          结束编辑")?;
    writeln!(out, "  :clear        清空输入框")?;
    writeln!(out, "  :show         各角色词数与当前设置")?;
    writeln!(out, "  :q            退出")
}
