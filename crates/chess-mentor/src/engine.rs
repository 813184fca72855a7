//! UCI engine session: discovery, startup, bounded analysis (async I/O)

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use shakmaty::{Chess, Color, Position};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::score::{EngineScore, Score};

/// Directory searched for a bundled engine, relative to the working directory.
pub const ENGINE_DIR: &str = "Engines";

/// Bundled executable names, in probe order
pub const BUNDLED_ENGINE_NAMES: &[&str] = &[
    "stockfish-windows-x86-64-avx2.exe",
    "stockfish-windows-x86-64.exe",
    "stockfish",
    "stockfish.exe",
];

/// Names looked up on `PATH` when nothing is bundled
pub const PATH_ENGINE_NAMES: &[&str] = &["stockfish", "stockfish.exe"];

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
/// Extra time allowed past the requested movetime before a search is abandoned.
const ANALYSIS_GRACE: Duration = Duration::from_secs(5);
const QUIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Search bounds for one analysis; the engine stops at whichever comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub depth: u32,
    pub movetime: Duration,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            depth: 20,
            movetime: Duration::from_millis(1000),
        }
    }
}

impl SearchLimits {
    pub fn go_command(&self) -> String {
        format!(
            "go depth {} movetime {}",
            self.depth,
            self.movetime.as_millis()
        )
    }

    /// Wall-clock bound on waiting for `bestmove`.
    pub fn deadline(&self) -> Duration {
        self.movetime + ANALYSIS_GRACE
    }
}

/// UCI options applied once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub threads: u32,
    pub hash_mb: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            hash_mb: 64,
        }
    }
}

/// Result of a single position evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalResult {
    /// Last score reported, from the side to move's perspective
    pub score: EngineScore,
    /// Best move in UCI notation; absent when the position has no legal moves
    pub best_move: Option<String>,
    pub depth: Option<u32>,
}

/// Something that can score chess positions.
#[async_trait]
pub trait Evaluator: Send {
    async fn analyze(
        &mut self,
        position: &Chess,
        limits: SearchLimits,
    ) -> Result<EvalResult, EngineError>;

    /// Release the engine. Safe to call more than once.
    async fn quit(&mut self);
}

/// Locate an engine executable.
///
/// An explicit `hint` wins: an existing file is used as is, a bare command
/// name is looked up on `PATH`, anything else means no engine. Without a hint
/// the bundled [`ENGINE_DIR`] is searched first, then `PATH`.
pub fn discover(hint: Option<&Path>) -> Option<PathBuf> {
    discover_in(hint, Path::new("."), std::env::var_os("PATH"))
}

pub(crate) fn discover_in(
    hint: Option<&Path>,
    base: &Path,
    search_path: Option<OsString>,
) -> Option<PathBuf> {
    if let Some(hint) = hint {
        if hint.is_file() {
            return Some(hint.to_path_buf());
        }
        let is_bare_name = hint.components().count() == 1 && hint.parent() == Some(Path::new(""));
        if is_bare_name {
            if let Some(name) = hint.to_str() {
                if let Some(found) = search_path_for(search_path.as_ref(), &[name]) {
                    return Some(found);
                }
            }
        }
        warn!(path = %hint.display(), "Configured engine not found");
        return None;
    }

    let bundled = base.join(ENGINE_DIR);
    for name in BUNDLED_ENGINE_NAMES {
        let candidate = bundled.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    search_path_for(search_path.as_ref(), PATH_ENGINE_NAMES)
}

fn search_path_for(search_path: Option<&OsString>, names: &[&str]) -> Option<PathBuf> {
    let search_path = search_path?;
    for dir in std::env::split_paths(search_path) {
        for name in names {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Discover and start an engine. `None` means evaluation is unavailable;
/// the reason is logged, never raised.
pub async fn start(hint: Option<&Path>, options: EngineOptions) -> Option<UciEngine> {
    let Some(path) = discover(hint) else {
        warn!("No chess engine found; move evaluation disabled");
        return None;
    };

    match UciEngine::spawn(&path, options).await {
        Ok(engine) => {
            info!(path = %path.display(), name = engine.name(), "Engine ready");
            Some(engine)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to start engine; move evaluation disabled");
            None
        }
    }
}

/// A running UCI engine process
pub struct UciEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    name: String,
    closed: bool,
}

impl UciEngine {
    /// Spawn the executable and complete the UCI handshake.
    pub async fn spawn(path: &Path, options: EngineOptions) -> Result<Self, EngineError> {
        let mut process = Command::new(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: path.display().to_string(),
                source,
            })?;

        let (Some(stdin), Some(stdout)) = (process.stdin.take(), process.stdout.take()) else {
            let _ = process.start_kill();
            return Err(EngineError::Handshake("engine pipes were not captured".to_string()));
        };

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            name: String::new(),
            closed: false,
        };

        match tokio::time::timeout(HANDSHAKE_TIMEOUT, engine.handshake(options)).await {
            Ok(Ok(())) => Ok(engine),
            Ok(Err(e)) => {
                engine.kill().await;
                Err(EngineError::Handshake(e.to_string()))
            }
            Err(_) => {
                engine.kill().await;
                Err(EngineError::Timeout(HANDSHAKE_TIMEOUT))
            }
        }
    }

    /// Engine name from `id name`, or empty if it never sent one.
    pub fn name(&self) -> &str {
        &self.name
    }

    async fn handshake(&mut self, options: EngineOptions) -> Result<(), EngineError> {
        self.send("uci").await?;
        loop {
            let line = self.read_line().await?;
            if let Some(name) = line.strip_prefix("id name ") {
                self.name = name.trim().to_string();
            } else if line == "uciok" {
                break;
            }
        }

        self.send(&format!("setoption name Threads value {}", options.threads))
            .await?;
        self.send(&format!("setoption name Hash value {}", options.hash_mb))
            .await?;
        self.send("setoption name UCI_AnalyseMode value true").await?;
        self.sync().await
    }

    /// Drain anything left over from an earlier search and wait until idle.
    async fn sync(&mut self) -> Result<(), EngineError> {
        self.send("isready").await?;
        self.wait_for("readyok").await
    }

    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!(cmd, "UCI <");
        self.stdin.write_all(format!("{cmd}\n").as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line).await? == 0 {
            return Err(EngineError::Closed);
        }
        let trimmed = line.trim();
        debug!(line = trimmed, "UCI >");
        Ok(trimmed.to_string())
    }

    async fn wait_for(&mut self, expected: &str) -> Result<(), EngineError> {
        loop {
            if self.read_line().await? == expected {
                return Ok(());
            }
        }
    }

    async fn search(
        &mut self,
        fen: &str,
        pov: Color,
        limits: SearchLimits,
    ) -> Result<EvalResult, EngineError> {
        self.sync().await?;
        self.send(&format!("position fen {fen}")).await?;
        self.send(&limits.go_command()).await?;

        let mut score = Score::Missing;
        let mut depth = None;
        loop {
            let line = self.read_line().await?;
            if let Some(info) = parse_info(&line) {
                if let Some(reported) = info.score {
                    score = reported;
                }
                if info.depth.is_some() {
                    depth = info.depth;
                }
            } else if let Some(rest) = line.strip_prefix("bestmove") {
                let best_move = rest
                    .split_whitespace()
                    .next()
                    .filter(|mv| *mv != "(none)" && *mv != "0000")
                    .map(str::to_string);
                return Ok(EvalResult {
                    score: EngineScore::new(pov, score),
                    best_move,
                    depth,
                });
            }
        }
    }

    async fn kill(&mut self) {
        let _ = self.process.start_kill();
        let _ = self.process.wait().await;
        self.closed = true;
    }
}

#[async_trait]
impl Evaluator for UciEngine {
    async fn analyze(
        &mut self,
        position: &Chess,
        limits: SearchLimits,
    ) -> Result<EvalResult, EngineError> {
        if self.closed {
            return Err(EngineError::Closed);
        }

        let fen = chess_core::to_fen(position);
        let deadline = limits.deadline();
        match tokio::time::timeout(deadline, self.search(&fen, position.turn(), limits)).await {
            Ok(Err(EngineError::Closed)) => {
                warn!(engine = %self.name, "Engine exited during search");
                self.closed = true;
                Err(EngineError::Closed)
            }
            Ok(result) => result,
            Err(_) => {
                warn!(engine = %self.name, ?deadline, "Search overran its deadline, stopping");
                // The stale bestmove is drained by the next sync.
                let _ = self.send("stop").await;
                Err(EngineError::Timeout(deadline))
            }
        }
    }

    async fn quit(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let _ = self.send("quit").await;
        if tokio::time::timeout(QUIT_TIMEOUT, self.process.wait())
            .await
            .is_err()
        {
            warn!(engine = %self.name, "Engine ignored quit, killing");
            let _ = self.process.start_kill();
            let _ = self.process.wait().await;
        }
        info!(engine = %self.name, "Engine stopped");
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct InfoLine {
    depth: Option<u32>,
    score: Option<Score>,
}

/// Parse an `info` line. Returns `None` for any other line.
///
/// A `score` token with an unreadable value yields `Score::Missing`.
fn parse_info(line: &str) -> Option<InfoLine> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("info") {
        return None;
    }

    let mut info = InfoLine::default();
    while let Some(token) = tokens.next() {
        match token {
            "depth" => info.depth = tokens.next().and_then(|v| v.parse().ok()),
            "score" => {
                let kind = tokens.next();
                let value = tokens.next().and_then(|v| v.parse::<i32>().ok());
                info.score = Some(match (kind, value) {
                    (Some("cp"), Some(cp)) => Score::Cp(cp),
                    (Some("mate"), Some(n)) => Score::Mate(n),
                    _ => Score::Missing,
                });
            }
            // Free text or move lists follow; nothing after them is needed.
            "string" | "pv" => break,
            _ => {}
        }
    }
    Some(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_cp() {
        let line = "info depth 20 seldepth 25 multipv 1 score cp 35 nodes 100000 pv e2e4";
        assert_eq!(
            parse_info(line),
            Some(InfoLine {
                depth: Some(20),
                score: Some(Score::Cp(35)),
            })
        );
    }

    #[test]
    fn test_parse_mate() {
        let line = "info depth 20 score mate -3 nodes 100000 pv e2e4";
        assert_eq!(parse_info(line).unwrap().score, Some(Score::Mate(-3)));
    }

    #[test]
    fn test_parse_bound_score() {
        let line = "info depth 12 score cp 48 lowerbound nodes 9000 pv d2d4";
        assert_eq!(parse_info(line).unwrap().score, Some(Score::Cp(48)));
    }

    #[test]
    fn test_parse_malformed_score() {
        assert_eq!(
            parse_info("info depth 5 score cp abc").unwrap().score,
            Some(Score::Missing)
        );
        assert_eq!(
            parse_info("info depth 5 score").unwrap().score,
            Some(Score::Missing)
        );
    }

    #[test]
    fn test_parse_ignores_text_after_string_and_pv() {
        let info = parse_info("info string score cp 900").unwrap();
        assert_eq!(info.score, None);

        let info = parse_info("info depth 3 pv e2e4 depth 99").unwrap();
        assert_eq!(info.depth, Some(3));
    }

    #[test]
    fn test_non_info_lines() {
        assert_eq!(parse_info("bestmove e2e4 ponder e7e5"), None);
        assert_eq!(parse_info("readyok"), None);
        assert_eq!(parse_info(""), None);
    }

    #[test]
    fn test_go_command() {
        let limits = SearchLimits {
            depth: 12,
            movetime: Duration::from_millis(250),
        };
        assert_eq!(limits.go_command(), "go depth 12 movetime 250");
        assert_eq!(SearchLimits::default().go_command(), "go depth 20 movetime 1000");
        assert_eq!(limits.deadline(), Duration::from_millis(5250));
    }

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_discover_prefers_bundled_order() {
        let dir = TempDir::new().unwrap();
        let bundled = dir.path().join(ENGINE_DIR);
        touch(&bundled.join("stockfish"));
        touch(&bundled.join("stockfish-windows-x86-64.exe"));

        let found = discover_in(None, dir.path(), None).unwrap();
        assert_eq!(found, bundled.join("stockfish-windows-x86-64.exe"));
    }

    #[test]
    fn test_discover_falls_back_to_path() {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("bin");
        touch(&bin.join("stockfish"));
        let search = std::env::join_paths([bin.clone()]).unwrap();

        let found = discover_in(None, dir.path(), Some(search)).unwrap();
        assert_eq!(found, bin.join("stockfish"));
    }

    #[test]
    fn test_discover_nothing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(discover_in(None, dir.path(), None), None);
    }

    #[test]
    fn test_discover_hint() {
        let dir = TempDir::new().unwrap();
        let custom = dir.path().join("my-engine");
        touch(&custom);
        touch(&dir.path().join(ENGINE_DIR).join("stockfish"));

        assert_eq!(
            discover_in(Some(&custom), dir.path(), None),
            Some(custom.clone())
        );

        // A missing explicit path does not fall back to bundled engines.
        let missing = dir.path().join("nope");
        assert_eq!(discover_in(Some(&missing), dir.path(), None), None);
    }

    #[test]
    fn test_discover_bare_hint_uses_path() {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("bin");
        touch(&bin.join("fairy-stockfish"));
        let search = std::env::join_paths([bin.clone()]).unwrap();

        let found = discover_in(Some(Path::new("fairy-stockfish")), dir.path(), Some(search));
        assert_eq!(found, Some(bin.join("fairy-stockfish")));
    }
}
