//! Ancestry-based process tree termination.
//!
//! git spawns helpers (`git-remote-https`, pagers, hooks, credential managers) that do
//! not die with their parent. Cancelling an invocation therefore walks the live process
//! table, builds a parent-id index, and terminates every descendant of the target
//! before the target itself: first gracefully, then forcefully for whatever is still
//! alive after the grace period.
//!
//! The process table comes from `/proc` on Linux and from `sysinfo` elsewhere. Unix
//! processes get SIGTERM then SIGKILL. Windows has no graceful stop for a process
//! without a window, so both steps call `TerminateProcess`. Every failure here is
//! swallowed: the processes may already be gone, and cancellation is cleanup, not a
//! reportable operation.

use std::collections::{HashMap, HashSet};
use std::thread;
use std::time::{Duration, Instant};

/// How long terminated processes get to exit before they are killed.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(500);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// `(pid, parent pid)` for every live process.
#[cfg(target_os = "linux")]
fn process_table() -> Vec<(u32, u32)> {
    let Ok(entries) = std::fs::read_dir("/proc") else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok()?.file_name().to_str()?.parse::<u32>().ok())
        .filter_map(|pid| {
            let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
            let (_, ppid) = parse_stat(&stat)?;
            Some((pid, ppid))
        })
        .collect()
}

#[cfg(not(target_os = "linux"))]
fn process_table() -> Vec<(u32, u32)> {
    use sysinfo::{ProcessesToUpdate, System};

    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);
    system
        .processes()
        .iter()
        .filter_map(|(pid, process)| Some((pid.as_u32(), process.parent()?.as_u32())))
        .collect()
}

/// State character and parent pid from a `/proc/<pid>/stat` line.
///
/// The command name is parenthesised and may itself contain spaces and parentheses,
/// so fields are read after the last `)`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_stat(stat: &str) -> Option<(char, u32)> {
    let rest = &stat[stat.rfind(')')? + 1..];
    let mut fields = rest.split_whitespace();
    let state = fields.next()?.chars().next()?;
    let ppid = fields.next()?.parse().ok()?;
    Some((state, ppid))
}

fn children_index(table: &[(u32, u32)]) -> HashMap<u32, Vec<u32>> {
    let mut index: HashMap<u32, Vec<u32>> = HashMap::new();
    for &(pid, ppid) in table {
        index.entry(ppid).or_default().push(pid);
    }
    index
}

fn collect_descendants(
    index: &HashMap<u32, Vec<u32>>,
    pid: u32,
    seen: &mut HashSet<u32>,
    out: &mut Vec<u32>,
) {
    let Some(children) = index.get(&pid) else {
        return;
    };
    for &child in children {
        if seen.insert(child) {
            collect_descendants(index, child, seen, out);
            out.push(child);
        }
    }
}

/// Every live descendant of `pid`, deepest first.
pub fn descendants(pid: u32) -> Vec<u32> {
    let index = children_index(&process_table());
    let mut seen = HashSet::from([pid]);
    let mut out = Vec::new();
    collect_descendants(&index, pid, &mut seen, &mut out);
    out
}

/// Whether `pid` is a running process. Zombies count as gone.
#[cfg(target_os = "linux")]
pub fn is_alive(pid: u32) -> bool {
    std::fs::read_to_string(format!("/proc/{pid}/stat"))
        .ok()
        .and_then(|stat| parse_stat(&stat))
        .is_some_and(|(state, _)| !matches!(state, 'Z' | 'X'))
}

#[cfg(all(unix, not(target_os = "linux")))]
pub fn is_alive(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    matches!(
        kill(Pid::from_raw(pid as i32), None),
        Ok(()) | Err(Errno::EPERM)
    )
}

#[cfg(windows)]
pub fn is_alive(pid: u32) -> bool {
    with_process(pid, |_| ()).is_some()
}

#[cfg(not(any(unix, windows)))]
pub fn is_alive(_pid: u32) -> bool {
    false
}

/// Runs `f` on a fresh snapshot of `pid`, if it exists.
#[cfg(windows)]
fn with_process<T>(pid: u32, f: impl FnOnce(&sysinfo::Process) -> T) -> Option<T> {
    use sysinfo::{Pid, ProcessesToUpdate, System};

    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system.process(pid).map(f)
}

#[derive(Debug, Clone, Copy)]
enum Termination {
    Graceful,
    Forceful,
}

#[cfg(unix)]
fn signal(pid: u32, termination: Termination) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let signal = match termination {
        Termination::Graceful => Signal::SIGTERM,
        Termination::Forceful => Signal::SIGKILL,
    };
    if let Err(err) = kill(Pid::from_raw(pid as i32), signal) {
        log::debug!("{signal} to pid {pid} failed: {err}");
    }
}

#[cfg(windows)]
fn signal(pid: u32, termination: Termination) {
    match with_process(pid, |process| process.kill()) {
        Some(true) => {}
        Some(false) => log::debug!("{termination:?} termination of pid {pid} failed"),
        None => log::debug!("pid {pid} already exited"),
    }
}

#[cfg(not(any(unix, windows)))]
fn signal(pid: u32, termination: Termination) {
    log::debug!("No {termination:?} termination for pid {pid} on this platform");
}

/// Terminate `pid` and all of its descendants, descendants first.
pub fn terminate_tree(pid: u32, grace_period: Duration) {
    let mut targets = descendants(pid);
    targets.push(pid);
    log::debug!("Terminating process tree of {pid}: {targets:?}");

    for &target in &targets {
        signal(target, Termination::Graceful);
    }

    let deadline = Instant::now() + grace_period;
    while Instant::now() < deadline && targets.iter().any(|&target| is_alive(target)) {
        thread::sleep(POLL_INTERVAL);
    }

    for &target in targets.iter().filter(|&&target| is_alive(target)) {
        log::debug!("pid {target} survived the grace period");
        signal(target, Termination::Forceful);
    }
}
