use clap::Subcommand;
use geocoin_core::*;
use std::fmt::Write;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub(crate) enum Cmd {
    /// Show position, wallet and visible caches
    Status,
    /// Walk one tile north, south, east or west
    Step {
        direction: Direction,
        #[arg(short, long, default_value_t = 1)]
        times: u32,
    },
    /// Jump to a position, as a location sensor would
    Goto {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
    },
    /// Take the top coin of the cache at I:J
    Collect {
        #[arg(allow_hyphen_values = true)]
        cell: Cell,
    },
    /// Put the top wallet coin into the cache at I:J
    Deposit {
        #[arg(allow_hyphen_values = true)]
        cell: Cell,
    },
    /// Erase wallet, trail and cache history
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// Print the movement trail
    History,
}

impl Cmd {
    /// Game commands this invocation turns into, empty for read-only ones.
    pub(crate) fn to_commands(&self) -> Vec<Command> {
        match *self {
            Self::Status | Self::History => Vec::new(),
            Self::Step { direction, times } => vec![Command::Step(direction); times as usize],
            Self::Goto { lat, lng } => vec![Command::MoveTo(LatLng::new(lat, lng))],
            Self::Collect { cell } => vec![Command::Collect(cell)],
            Self::Deposit { cell } => vec![Command::Deposit(cell)],
            Self::Reset { yes: true } => vec![Command::Reset],
            Self::Reset { yes: false } => Vec::new(),
        }
    }
}

/// Runs `cmd` against `session` and returns what to print.
pub(crate) fn dispatch<L: Luck, S: SnapshotStorage>(
    session: &mut GameSession<L, S>,
    cmd: &Cmd,
) -> anyhow::Result<String> {
    let mut out = String::new();

    if matches!(cmd, Cmd::Reset { yes: false }) {
        writeln!(out, "Reset erases your wallet and trail, rerun with --yes to confirm")?;
        return Ok(out);
    }
    if let Cmd::Goto { lat, lng } = *cmd {
        let point = LatLng::new(lat, lng);
        if !point.is_valid() {
            anyhow::bail!("Position {point} is not on the globe");
        }
    }

    for command in cmd.to_commands() {
        log::debug!("apply {command:?}");
        match session.apply(command)? {
            CommandOutcome::Moved(diff) | CommandOutcome::Reset(diff) => {
                write_diff(&mut out, session, &diff)?;
            }
            CommandOutcome::Transfer(TransferOutcome::Moved {
                coin,
                cache_coins,
                wallet_coins,
            }) => {
                writeln!(
                    out,
                    "moved {coin}, cache now holds {cache_coins}, wallet holds {wallet_coins}"
                )?;
            }
            CommandOutcome::Transfer(TransferOutcome::NoChange) => {
                writeln!(out, "nothing to move")?;
            }
            CommandOutcome::Ignored => {}
        }
    }

    match cmd {
        Cmd::History => write_history(&mut out, session)?,
        Cmd::Collect { .. } | Cmd::Deposit { .. } => {}
        _ => write_status(&mut out, session)?,
    }
    Ok(out)
}

fn write_diff<L: Luck, S: SnapshotStorage>(
    out: &mut String,
    session: &GameSession<L, S>,
    diff: &WindowDiff,
) -> std::fmt::Result {
    for cell in &diff.evicted {
        writeln!(out, "- {cell}")?;
    }
    for cell in diff.rendered() {
        let coins = session.active_cache(cell).map_or(0, Cache::len);
        writeln!(out, "+ {cell} ({coins} coins)")?;
    }
    Ok(())
}

fn write_status<L: Luck, S: SnapshotStorage>(
    out: &mut String,
    session: &mut GameSession<L, S>,
) -> std::fmt::Result {
    let cell = session.player_cell();
    let bounds = session.bounds_of(*cell);
    writeln!(out, "position {} in cell {cell}", session.position())?;
    writeln!(out, "cell spans {} to {}", bounds.south_west, bounds.north_east)?;

    let wallet: Vec<String> = session.wallet().iter().map(Coin::to_string).collect();
    writeln!(out, "wallet ({}): {}", wallet.len(), wallet.join(" "))?;

    writeln!(out, "caches in view:")?;
    for cache in session.active_caches() {
        let top = cache.top().map(Coin::to_string).unwrap_or_else(|| "-".into());
        writeln!(out, "  {} {:>3} coins, top {top}", cache.location(), cache.len())?;
    }
    Ok(())
}

fn write_history<L: Luck, S: SnapshotStorage>(
    out: &mut String,
    session: &GameSession<L, S>,
) -> std::fmt::Result {
    for (step, point) in session.history().iter().enumerate() {
        writeln!(out, "{step:>4} {point}")?;
    }
    Ok(())
}
