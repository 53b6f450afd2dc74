//! Sandboxed JavaScript strategy — a fresh V8 isolate per run.
//!
//! V8 isolates are `!Send`, so each run happens on a dedicated thread with
//! its own single-threaded tokio runtime. The public strategy is fully async
//! and `Send`-safe.
//!
//! The isolate starts with nothing: the bootstrap installs a captured
//! `console` as the only capability and removes everything else reachable
//! (`Deno`, `eval`, the Function constructors). There is no filesystem,
//! network, process or environment surface inside the sandbox.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deno_core::{v8, JsRuntime, PollEventLoopOptions, RuntimeOptions};
use tracing::{debug, warn};

use crate::config::types::SandboxConfig;
use crate::exec::traits::ExecutionStrategy;
use crate::exec::{ExecutionError, ExecutionResult};

/// Printed when a script produces no transcript at all.
const NO_OUTPUT_MESSAGE: &str = "Script executed successfully with no output.";

/// Locks down the isolate and installs the captured console.
///
/// The transcript lives in a closure; sandboxed code can append to it
/// through `console` and read it back through the frozen drain hook, and
/// nothing else. Each console call is one line; `error`/`warn` lines are
/// tagged so a single transcript can distinguish channels.
const BOOTSTRAP: &str = r#"
    (() => {
        const lines = [];
        const write = (prefix, args) => {
            lines.push(prefix + args.map((a) => String(a)).join(' '));
        };
        const console = Object.freeze({
            log: (...args) => write('', args),
            info: (...args) => write('', args),
            error: (...args) => write('ERROR: ', args),
            warn: (...args) => write('WARNING: ', args),
        });
        Object.defineProperty(globalThis, 'console', {
            value: console, writable: false, configurable: false
        });
        Object.defineProperty(globalThis, '__transcript', {
            value: () => lines.join('\n'), writable: false, configurable: false
        });

        delete globalThis.Deno;
        delete globalThis.eval;

        // Neuter code-generation reachable through prototype chains; with
        // these left in place, `console.log.constructor` is a working eval.
        const AsyncFunction = (async function () {}).constructor;
        const GeneratorFunction = (function* () {}).constructor;
        Object.defineProperty(Function.prototype, 'constructor', {
            value: undefined, configurable: false, writable: false
        });
        Object.defineProperty(AsyncFunction.prototype, 'constructor', {
            value: undefined, configurable: false, writable: false
        });
        Object.defineProperty(GeneratorFunction.prototype, 'constructor', {
            value: undefined, configurable: false, writable: false
        });
    })();
"#;

/// The one real interpreter among the execution strategies.
pub struct JavaScriptSandbox {
    config: SandboxConfig,
}

impl JavaScriptSandbox {
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ExecutionStrategy for JavaScriptSandbox {
    fn name(&self) -> &str {
        "javascript"
    }

    async fn run(&self, content: &str, budget: Duration) -> ExecutionResult {
        let code = content.to_string();
        let config = self.config.clone();

        // V8 isolates are !Send — run everything on a dedicated thread
        let (tx, rx) = tokio::sync::oneshot::channel();
        std::thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    let result = ExecutionResult::failed(ExecutionError::Runtime {
                        message: format!("sandbox could not start: {e}"),
                    });
                    if tx.send(result).is_err() {
                        warn!("sandbox result receiver dropped");
                    }
                    return;
                }
            };
            let result = rt.block_on(run_isolated(&config, &code, budget));
            if tx.send(result).is_err() {
                warn!("sandbox result receiver dropped before result was sent");
            }
        });

        match rx.await {
            Ok(result) => result,
            Err(_) => ExecutionResult::failed(ExecutionError::Runtime {
                message: "sandbox thread panicked".to_string(),
            }),
        }
    }
}

/// State for the near-heap-limit callback.
struct HeapLimitState {
    handle: v8::IsolateHandle,
    triggered: AtomicBool,
}

/// V8 near-heap-limit callback. Terminates execution and grants 1MB grace
/// so the termination exception can propagate instead of V8 aborting the
/// whole process.
extern "C" fn near_heap_limit_callback(
    data: *mut std::ffi::c_void,
    current_heap_limit: usize,
    _initial_heap_limit: usize,
) -> usize {
    // SAFETY: `data` points to the `HeapLimitState` box in `run_isolated`,
    // which outlives the isolate: V8 only fires this callback while script
    // execution is running, and the runtime is dropped before the box is.
    let state = unsafe { &*(data as *const HeapLimitState) };
    if !state.triggered.swap(true, Ordering::SeqCst) {
        state.handle.terminate_execution();
    }
    current_heap_limit + 1024 * 1024
}

/// Run one script in a fresh isolate on the current thread (must be called
/// from the dedicated sandbox thread, not the main tokio runtime).
async fn run_isolated(config: &SandboxConfig, code: &str, budget: Duration) -> ExecutionResult {
    let create_params =
        v8::CreateParams::default().heap_limits(0, config.max_heap_mb * 1024 * 1024);
    let mut runtime = JsRuntime::new(RuntimeOptions {
        create_params: Some(create_params),
        ..Default::default()
    });

    // --- Set up heap limit callback ---
    let heap_state = Box::new(HeapLimitState {
        handle: runtime.v8_isolate().thread_safe_handle(),
        triggered: AtomicBool::new(false),
    });
    runtime.v8_isolate().add_near_heap_limit_callback(
        near_heap_limit_callback,
        &*heap_state as *const HeapLimitState as *mut std::ffi::c_void,
    );

    if let Err(e) = runtime.execute_script("[scriptbox:bootstrap]", BOOTSTRAP) {
        let message = format!("sandbox bootstrap failed: {}", sanitize_js_error(&e.to_string()));
        drop(runtime);
        return ExecutionResult::failed(ExecutionError::Runtime { message });
    }

    // --- Set up CPU watchdog ---
    let watchdog_handle = runtime.v8_isolate().thread_safe_handle();
    let timed_out = Arc::new(AtomicBool::new(false));
    let watchdog_timed_out = timed_out.clone();
    let (cancel_tx, cancel_rx) = std::sync::mpsc::channel::<()>();

    let watchdog = std::thread::spawn(move || {
        if let Err(std::sync::mpsc::RecvTimeoutError::Timeout) = cancel_rx.recv_timeout(budget) {
            watchdog_timed_out.store(true, Ordering::SeqCst);
            watchdog_handle.terminate_execution();
        }
    });

    // --- Execute user code ---
    //
    // The async IIFE mirrors what the original tool promised its callers: a
    // script that throws is still a run, reported on the error channel of
    // the transcript rather than as a transport failure.
    let wrapped = format!(
        r#"
        (async () => {{
            try {{
{code}
            }} catch (err) {{
                console.error('Execution error:', err && err.message ? err.message : String(err));
            }}
        }})();
        "#
    );

    let exec_error = match runtime.execute_script("[scriptbox:run]", wrapped) {
        Ok(_) => {
            // Drive the event loop so async scripts settle
            match tokio::time::timeout(
                budget,
                runtime.run_event_loop(PollEventLoopOptions::default()),
            )
            .await
            {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(_) => {
                    timed_out.store(true, Ordering::SeqCst);
                    None
                }
            }
        }
        Err(e) => Some(e.to_string()),
    };

    // --- Cleanup: cancel the watchdog and wait for it to exit, so the
    // IsolateHandle is not used after the runtime is gone ---
    let _ = cancel_tx.send(());
    let _ = watchdog.join();

    if heap_state.triggered.load(Ordering::SeqCst) {
        drop(runtime);
        return ExecutionResult::failed(ExecutionError::Runtime {
            message: "Script exceeded the sandbox memory limit".to_string(),
        });
    }

    if timed_out.load(Ordering::SeqCst) {
        debug!(seconds = budget.as_secs(), "Sandbox execution timed out");
        drop(runtime);
        return ExecutionResult::failed(ExecutionError::Timeout {
            seconds: budget.as_secs(),
        });
    }

    if let Some(message) = exec_error {
        drop(runtime);
        return ExecutionResult::failed(ExecutionError::Runtime {
            message: sanitize_js_error(&message),
        });
    }

    // --- Drain the transcript ---
    let transcript = match runtime.execute_script("[scriptbox:drain]", "__transcript()") {
        Ok(value) => {
            let scope = &mut runtime.handle_scope();
            let local = v8::Local::new(scope, value);
            local.to_rust_string_lossy(scope)
        }
        Err(e) => {
            drop(runtime);
            return ExecutionResult::failed(ExecutionError::Runtime {
                message: format!(
                    "sandbox transcript unavailable: {}",
                    sanitize_js_error(&e.to_string())
                ),
            });
        }
    };
    drop(runtime);

    if transcript.is_empty() {
        return ExecutionResult::ok(NO_OUTPUT_MESSAGE);
    }

    let mut output = transcript;
    output.push('\n');
    ExecutionResult::ok(truncate_output(output, config.max_output_bytes))
}

/// Keep only the first line of a V8 error message: enough to explain a
/// syntax error, never a stack trace.
fn sanitize_js_error(message: &str) -> String {
    message.lines().next().unwrap_or("unknown error").to_string()
}

fn truncate_output(output: String, max_bytes: usize) -> String {
    if output.len() <= max_bytes {
        return output;
    }
    let mut cut = max_bytes;
    while cut > 0 && !output.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}\n[output truncated]\n", &output[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox() -> JavaScriptSandbox {
        JavaScriptSandbox::new(SandboxConfig::default())
    }

    fn budget() -> Duration {
        Duration::from_secs(5)
    }

    #[tokio::test]
    async fn test_console_log_is_captured_with_newline() {
        let result = sandbox().run(r#"console.log("hi")"#, budget()).await;
        assert!(result.success);
        assert_eq!(result.output, "hi\n");
    }

    #[tokio::test]
    async fn test_arguments_are_joined_with_spaces() {
        let result = sandbox().run(r#"console.log("a", 1, true)"#, budget()).await;
        assert!(result.success);
        assert_eq!(result.output, "a 1 true\n");
    }

    #[tokio::test]
    async fn test_channels_are_tagged() {
        let script = r#"
            console.log("plain");
            console.warn("careful");
            console.error("broken");
        "#;
        let result = sandbox().run(script, budget()).await;
        assert!(result.success);
        assert_eq!(result.output, "plain\nWARNING: careful\nERROR: broken\n");
    }

    #[tokio::test]
    async fn test_throwing_script_is_a_successful_run() {
        let result = sandbox()
            .run(r#"throw new Error("boom")"#, budget())
            .await;
        assert!(result.success);
        assert!(result.output.contains("ERROR: Execution error: boom"));
    }

    #[tokio::test]
    async fn test_empty_output_gets_placeholder_message() {
        let result = sandbox().run("const x = 1 + 1;", budget()).await;
        assert!(result.success);
        assert_eq!(result.output, NO_OUTPUT_MESSAGE);
    }

    #[tokio::test]
    async fn test_infinite_loop_times_out() {
        let result = sandbox()
            .run("while (true) {}", Duration::from_millis(300))
            .await;
        assert!(!result.success);
        assert!(matches!(
            result.error,
            Some(ExecutionError::Timeout { .. })
        ));
        assert!(result.output.is_empty());
    }

    #[tokio::test]
    async fn test_syntax_error_is_a_runtime_failure() {
        let result = sandbox().run("this is not javascript", budget()).await;
        assert!(!result.success);
        assert!(matches!(
            result.error,
            Some(ExecutionError::Runtime { .. })
        ));
    }

    #[tokio::test]
    async fn test_no_ambient_capabilities() {
        let script = r#"console.log(typeof require, typeof process, typeof Deno, typeof eval)"#;
        let result = sandbox().run(script, budget()).await;
        assert!(result.success);
        assert_eq!(result.output, "undefined undefined undefined undefined\n");
    }

    #[tokio::test]
    async fn test_function_constructor_is_blocked() {
        let result = sandbox()
            .run("console.log(String(console.log.constructor))", budget())
            .await;
        assert!(result.success);
        assert_eq!(result.output, "undefined\n");
    }

    #[tokio::test]
    async fn test_async_scripts_settle() {
        let script = r#"
            const v = await Promise.resolve(41).then((n) => n + 1);
            console.log("value:", v);
        "#;
        let result = sandbox().run(script, budget()).await;
        assert!(result.success);
        assert_eq!(result.output, "value: 42\n");
    }

    #[tokio::test]
    async fn test_oversized_transcript_is_truncated() {
        let strategy = JavaScriptSandbox::new(SandboxConfig {
            max_output_bytes: 64,
            ..SandboxConfig::default()
        });
        let script = r#"for (let i = 0; i < 100; i++) console.log("xxxxxxxxxx");"#;
        let result = strategy.run(script, budget()).await;
        assert!(result.success);
        assert!(result.output.ends_with("[output truncated]\n"));
        assert!(result.output.len() < 100);
    }
}
