//! Resolution of the application frame that produced a log event.
//!
//! Events reach the hook several frames below the application's actual log
//! call, through the subscriber's dispatch machinery. Inspecting the top of
//! the stack would attribute every event to the logging plumbing, so the
//! resolver walks upward and returns the first frame that does not belong
//! to it.

/// Resolved source location of an application log call.
///
/// An empty file/function and a zero line mean the stack could not be
/// attributed (exhausted, or symbols unavailable in this build).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    /// Raw path of the source file.
    pub file: String,
    /// Base segment of the function name, compiler hash dropped.
    pub func: String,
    pub line: u32,
}

/// Upper bound on frames inspected past the starting depth.
const FRAME_SCAN_LIMIT: usize = 10;

/// Namespace prefixes of frames that are logging machinery rather than
/// application code. This crate's own frames match the `tracing` prefix.
const SKIP_PREFIXES: &[&str] = &["backtrace", "tracing", "tokio", "std", "core"];

/// One captured stack frame, before any filtering.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawFrame {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub symbol: Option<String>,
}

/// Capture the live stack and resolve the nearest application frame,
/// starting `depth` frames up from the capture point.
pub fn resolve(depth: usize) -> CallSite {
    let mut frames = Vec::with_capacity(depth + FRAME_SCAN_LIMIT);
    backtrace::trace(|frame| {
        let mut captured = RawFrame::default();
        backtrace::resolve_frame(frame, |symbol| {
            captured.symbol = symbol.name().map(|name| name.to_string());
            captured.file = symbol.filename().map(|path| path.display().to_string());
            captured.line = symbol.lineno();
        });
        frames.push(captured);
        frames.len() < depth + FRAME_SCAN_LIMIT
    });
    find_caller(frames, depth)
}

/// Walk `frames` from `depth`, skipping logging-machinery frames, and return
/// the first application frame. Frames without symbol data end the walk.
pub(crate) fn find_caller<I>(frames: I, depth: usize) -> CallSite
where
    I: IntoIterator<Item = RawFrame>,
{
    let mut frames = frames.into_iter().skip(depth);
    for _ in 0..FRAME_SCAN_LIMIT {
        let Some(frame) = frames.next() else { break };
        let Some(symbol) = frame.symbol else { break };
        if is_machinery(&symbol) {
            continue;
        }
        return CallSite {
            file: frame.file.unwrap_or_default(),
            func: base_name(&symbol).to_string(),
            line: frame.line.unwrap_or(0),
        };
    }
    CallSite::default()
}

fn is_machinery(symbol: &str) -> bool {
    // Trait-impl symbols are rendered as `<a::B as c::D>::method`.
    let qualified = symbol.trim_start_matches('<');
    SKIP_PREFIXES.iter().any(|prefix| qualified.starts_with(prefix))
}

/// Reduce a fully qualified symbol to its base segment:
/// `app::server::handle::h0f3a90d1c2b4e687` becomes `handle`.
fn base_name(symbol: &str) -> &str {
    let mut segments = symbol.rsplit("::");
    let last = segments.next().unwrap_or(symbol);
    if is_symbol_hash(last) {
        segments.next().unwrap_or(last)
    } else {
        last
    }
}

fn is_symbol_hash(segment: &str) -> bool {
    segment.len() == 17
        && segment.starts_with('h')
        && segment[1..].chars().all(|c| c.is_ascii_hexdigit())
}
