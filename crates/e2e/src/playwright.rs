//! Playwright browser automation
//!
//! A small node driver is started once per environment and kept alive for
//! the whole run. Commands go to its stdin and replies come back on stdout,
//! one JSON object per line. Every command carries an id that its reply
//! echoes; a reply left over from an abandoned command is discarded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use certcheck_common::DropdownProbe;

use crate::error::{E2eError, E2eResult};
use crate::flow::{DROPDOWN_SELECTOR, SUBTITLE_SELECTOR, TITLE_SELECTOR};
use crate::page::{BrowserPage, WaitState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::Playwright(format!("unknown browser: {}", other))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    /// Node executable
    pub node: PathBuf,

    /// Directory node resolves `playwright` from
    pub working_dir: Option<PathBuf>,

    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// How long to wait for the browser to launch
    pub launch_timeout: Duration,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            node: PathBuf::from("node"),
            working_dir: None,
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            launch_timeout: Duration::from_secs(60),
        }
    }
}

/// Options handed to the driver script on launch
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LaunchOptions {
    browser: Browser,
    headless: bool,
    width: u32,
    height: u32,
}

const DRIVER_OPTIONS_VAR: &str = "CERTCHECK_DRIVER_OPTIONS";

/// Node driver. Reads one command per stdin line and answers each with one
/// JSON line on stdout.
pub const DRIVER_SCRIPT: &str = r#"
const playwright = require('playwright');
const readline = require('readline');

const options = JSON.parse(process.env.CERTCHECK_DRIVER_OPTIONS || '{}');
const reply = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');

(async () => {
  const browser = await playwright[options.browser || 'chromium'].launch({ headless: options.headless !== false });
  const context = await browser.newContext({
    viewport: { width: options.width || 1280, height: options.height || 720 }
  });
  const page = await context.newPage();
  reply({ id: 0, ok: true });

  const rl = readline.createInterface({ input: process.stdin });
  for await (const line of rl) {
    if (!line.trim()) continue;
    let cmd;
    try {
      cmd = JSON.parse(line);
    } catch (error) {
      reply({ ok: false, error: 'bad command: ' + error.message });
      continue;
    }
    const answer = (msg) => reply({ id: cmd.id, ...msg });
    try {
      switch (cmd.op) {
        case 'goto':
          await page.goto(cmd.url, { waitUntil: 'domcontentloaded', timeout: cmd.timeoutMs });
          answer({ ok: true });
          break;
        case 'fill':
          await page.fill(cmd.selector, cmd.value, { timeout: cmd.timeoutMs });
          answer({ ok: true });
          break;
        case 'click':
          await page.click(cmd.selector, { timeout: cmd.timeoutMs });
          answer({ ok: true });
          break;
        case 'wait_for':
          await page.locator(cmd.selector).first().waitFor({ state: cmd.state, timeout: cmd.timeoutMs });
          answer({ ok: true });
          break;
        case 'texts':
          answer({ ok: true, texts: await page.locator(cmd.scope).locator(cmd.selector).allTextContents() });
          break;
        case 'visible_text': {
          const visible = await page.locator(cmd.scope).locator('text=' + cmd.text).first()
            .isVisible().catch(() => false);
          answer({ ok: true, visible });
          break;
        }
        case 'screenshot':
          await page.screenshot({ path: cmd.path, fullPage: cmd.fullPage });
          answer({ ok: true });
          break;
        case 'close':
          answer({ ok: true });
          await browser.close();
          process.exit(0);
        default:
          answer({ ok: false, error: 'unknown op: ' + cmd.op });
      }
    } catch (error) {
      answer({ ok: false, error: error.message });
    }
  }
  await browser.close();
})().catch((error) => {
  console.error(error.stack || String(error));
  process.exit(1);
});
"#;

/// One request to the driver
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DriverCommand {
    #[serde(rename_all = "camelCase")]
    Goto { url: String, timeout_ms: u64 },
    #[serde(rename_all = "camelCase")]
    Fill {
        selector: String,
        value: String,
        timeout_ms: u64,
    },
    #[serde(rename_all = "camelCase")]
    Click { selector: String, timeout_ms: u64 },
    #[serde(rename_all = "camelCase")]
    WaitFor {
        selector: String,
        state: WaitState,
        timeout_ms: u64,
    },
    Texts { scope: String, selector: String },
    VisibleText { scope: String, text: String },
    #[serde(rename_all = "camelCase")]
    Screenshot { path: String, full_page: bool },
    Close,
}

impl DriverCommand {
    /// Short label for logs and step errors
    pub fn describe(&self) -> String {
        match self {
            DriverCommand::Goto { url, .. } => format!("goto:{}", url),
            DriverCommand::Fill { selector, .. } => format!("fill:{}", selector),
            DriverCommand::Click { selector, .. } => format!("click:{}", selector),
            DriverCommand::WaitFor { selector, state, .. } => format!("wait:{}:{}", state, selector),
            DriverCommand::Texts { selector, .. } => format!("texts:{}", selector),
            DriverCommand::VisibleText { text, .. } => format!("visible:{}", text),
            DriverCommand::Screenshot { path, .. } => format!("screenshot:{}", path),
            DriverCommand::Close => "close".to_string(),
        }
    }
}

/// A command on the wire, tagged with the id its reply must echo
#[derive(Debug, Serialize)]
struct DriverRequest<'a> {
    id: u64,
    #[serde(flatten)]
    command: &'a DriverCommand,
}

/// Id of the reply the driver sends once the browser is up
const READY_ID: u64 = 0;

/// One reply from the driver
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverReply {
    #[serde(default)]
    pub id: Option<u64>,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub texts: Option<Vec<String>>,
    #[serde(default)]
    pub visible: Option<bool>,
}

fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}

/// Parse one stdout line as the reply to request `id`
fn parse_reply(line: &str, id: u64) -> Option<DriverReply> {
    match serde_json::from_str::<DriverReply>(line) {
        Ok(reply) if reply.id == Some(id) => Some(reply),
        Ok(reply) => {
            debug!("Discarding stale driver reply {:?} while waiting for {}", reply.id, id);
            None
        }
        Err(_) => {
            debug!("driver: {}", line);
            None
        }
    }
}

struct DriverIo {
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
}

/// A live browser page behind the node driver
pub struct PlaywrightSession {
    child: Child,
    io: Mutex<DriverIo>,
}

impl PlaywrightSession {
    /// Check that node can load the playwright package
    pub async fn check_installed(config: &PlaywrightConfig) -> E2eResult<()> {
        let mut cmd = TokioCommand::new(&config.node);
        cmd.args(["-e", "require.resolve('playwright')"])
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = &config.working_dir {
            cmd.current_dir(dir);
        }

        match cmd.status().await {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Start the driver and wait for the browser to come up
    pub async fn launch(config: &PlaywrightConfig) -> E2eResult<Self> {
        Self::check_installed(config).await?;

        let options = serde_json::to_string(&LaunchOptions {
            browser: config.browser,
            headless: config.headless,
            width: config.viewport_width,
            height: config.viewport_height,
        })?;

        let mut cmd = TokioCommand::new(&config.node);
        cmd.args(["-e", DRIVER_SCRIPT])
            .env(DRIVER_OPTIONS_VAR, options)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &config.working_dir {
            cmd.current_dir(dir);
        }

        info!("Launching {} via Playwright", config.browser.as_str());
        let mut child = cmd
            .spawn()
            .map_err(|e| E2eError::Playwright(format!("Failed to spawn {}: {}", config.node.display(), e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Playwright("driver stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("driver stdout unavailable".to_string()))?;

        let session = Self {
            child,
            io: Mutex::new(DriverIo {
                stdin,
                stdout: BufReader::new(stdout).lines(),
                next_id: READY_ID + 1,
            }),
        };

        let ready = {
            let mut io = session.io.lock().await;
            tokio::time::timeout(config.launch_timeout, Self::read_reply(&mut io, READY_ID)).await
        };
        match ready {
            Ok(Ok(reply)) if reply.ok => Ok(session),
            Ok(Ok(reply)) => Err(E2eError::Playwright(reply.error.unwrap_or_else(|| "launch failed".to_string()))),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(E2eError::Timeout(format!(
                "browser launch ({}s)",
                config.launch_timeout.as_secs()
            ))),
        }
    }

    async fn read_reply(io: &mut DriverIo, id: u64) -> E2eResult<DriverReply> {
        loop {
            let line = io.stdout.next_line().await?.ok_or(E2eError::DriverExited)?;
            if let Some(reply) = parse_reply(&line, id) {
                return Ok(reply);
            }
        }
    }

    /// Send one command and wait for its reply
    pub async fn send(&self, command: DriverCommand) -> E2eResult<DriverReply> {
        let mut io = self.io.lock().await;
        let id = io.next_id;
        io.next_id += 1;

        let mut line = serde_json::to_string(&DriverRequest { id, command: &command })?;
        line.push('\n');
        io.stdin.write_all(line.as_bytes()).await?;
        io.stdin.flush().await?;
        let reply = Self::read_reply(&mut io, id).await?;

        if reply.ok {
            Ok(reply)
        } else {
            Err(E2eError::StepFailed {
                step: command.describe(),
                reason: reply.error.unwrap_or_else(|| "unknown error".to_string()),
            })
        }
    }

    async fn dropdown_texts(&self, selector: &str) -> E2eResult<Vec<String>> {
        let reply = self
            .send(DriverCommand::Texts {
                scope: DROPDOWN_SELECTOR.to_string(),
                selector: selector.to_string(),
            })
            .await?;
        Ok(reply.texts.unwrap_or_default())
    }

    /// Ask the driver to close the browser and wait for it to exit
    pub async fn close(mut self) -> E2eResult<()> {
        if let Err(e) = self.send(DriverCommand::Close).await {
            warn!("Driver did not close cleanly: {}", e);
        }
        self.child.wait().await?;
        Ok(())
    }
}

impl Drop for PlaywrightSession {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
    }
}

#[async_trait]
impl DropdownProbe for PlaywrightSession {
    async fn title_texts(&self) -> certcheck_common::Result<Vec<String>> {
        Ok(self.dropdown_texts(TITLE_SELECTOR).await?)
    }

    async fn subtitle_texts(&self) -> certcheck_common::Result<Vec<String>> {
        Ok(self.dropdown_texts(SUBTITLE_SELECTOR).await?)
    }

    async fn is_text_visible(&self, text: &str) -> certcheck_common::Result<bool> {
        let reply = self
            .send(DriverCommand::VisibleText {
                scope: DROPDOWN_SELECTOR.to_string(),
                text: text.to_string(),
            })
            .await?;
        Ok(reply.visible.unwrap_or(false))
    }
}

#[async_trait]
impl BrowserPage for PlaywrightSession {
    async fn goto(&self, url: &str, timeout: Duration) -> E2eResult<()> {
        self.send(DriverCommand::Goto {
            url: url.to_string(),
            timeout_ms: millis(timeout),
        })
        .await?;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str, timeout: Duration) -> E2eResult<()> {
        self.send(DriverCommand::Fill {
            selector: selector.to_string(),
            value: value.to_string(),
            timeout_ms: millis(timeout),
        })
        .await?;
        Ok(())
    }

    async fn click(&self, selector: &str, timeout: Duration) -> E2eResult<()> {
        self.send(DriverCommand::Click {
            selector: selector.to_string(),
            timeout_ms: millis(timeout),
        })
        .await?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, state: WaitState, timeout: Duration) -> E2eResult<()> {
        self.send(DriverCommand::WaitFor {
            selector: selector.to_string(),
            state,
            timeout_ms: millis(timeout),
        })
        .await?;
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> E2eResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.send(DriverCommand::Screenshot {
            path: path.to_string_lossy().to_string(),
            full_page: true,
        })
        .await?;
        Ok(())
    }

    fn as_probe(&self) -> &dyn DropdownProbe {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let cmd = DriverCommand::WaitFor {
            selector: DROPDOWN_SELECTOR.to_string(),
            state: WaitState::Hidden,
            timeout_ms: 30_000,
        };
        let json: serde_json::Value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["op"], "wait_for");
        assert_eq!(json["state"], "hidden");
        assert_eq!(json["timeoutMs"], 30_000);
        assert_eq!(json["selector"], DROPDOWN_SELECTOR);

        let json = serde_json::to_value(&DriverCommand::VisibleText {
            scope: "div".into(),
            text: "Diploma of Community Services".into(),
        })
        .unwrap();
        assert_eq!(json["op"], "visible_text");
        assert_eq!(json["text"], "Diploma of Community Services");

        let json = serde_json::to_value(&DriverCommand::Screenshot {
            path: "report/aia-certification-dropdown-validated.png".into(),
            full_page: true,
        })
        .unwrap();
        assert_eq!(json["fullPage"], true);
        assert_eq!(serde_json::to_string(&DriverCommand::Close).unwrap(), r#"{"op":"close"}"#);

        let request = DriverRequest {
            id: 7,
            command: &DriverCommand::Click {
                selector: "text=Continue".into(),
                timeout_ms: 60_000,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["op"], "click");
        assert_eq!(json["selector"], "text=Continue");
    }

    #[test]
    fn test_stale_replies_are_skipped() {
        // reply to an abandoned visibility check, then the one we asked for
        assert!(parse_reply(r#"{"id":4,"ok":true,"visible":false}"#, 5).is_none());
        assert!(parse_reply("Downloading browser...", 5).is_none());
        assert!(parse_reply(r#"{"ok":false,"error":"bad command"}"#, 5).is_none());

        let reply = parse_reply(r#"{"id":5,"ok":true}"#, 5).unwrap();
        assert!(reply.ok);
        assert_eq!(parse_reply(r#"{"id":0,"ok":true}"#, READY_ID).unwrap().id, Some(READY_ID));
    }

    #[test]
    fn test_driver_handles_every_op() {
        for op in [
            "'goto'",
            "'fill'",
            "'click'",
            "'wait_for'",
            "'texts'",
            "'visible_text'",
            "'screenshot'",
            "'close'",
        ] {
            assert!(DRIVER_SCRIPT.contains(op), "driver is missing {}", op);
        }
        assert!(DRIVER_SCRIPT.contains(DRIVER_OPTIONS_VAR));
        assert!(DRIVER_SCRIPT.contains("id: cmd.id"));
    }

    #[test]
    fn test_reply_parsing() {
        let reply: DriverReply =
            serde_json::from_str(r#"{"id":3,"ok":true,"texts":["Cancel"," BSB50420 "]}"#).unwrap();
        assert!(reply.ok);
        assert_eq!(reply.id, Some(3));
        assert_eq!(reply.texts.unwrap().len(), 2);

        let reply: DriverReply = serde_json::from_str(r#"{"ok":false,"error":"Timeout 30000ms exceeded"}"#).unwrap();
        assert!(!reply.ok);
        assert_eq!(reply.error.as_deref(), Some("Timeout 30000ms exceeded"));
    }

    #[test]
    fn test_browser_names() {
        assert_eq!("Firefox".parse::<Browser>().unwrap(), Browser::Firefox);
        assert_eq!(Browser::default().as_str(), "chromium");
        assert!("lynx".parse::<Browser>().is_err());
    }
}
