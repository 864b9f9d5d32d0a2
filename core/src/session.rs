use std::collections::{BTreeMap, BTreeSet};

use crate::*;

/// Sample from a position sensor.
pub type PositionSample = core::result::Result<LatLng, SensorError>;

/// Rendering changes produced by a visibility refresh, in evaluation order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowDiff {
    /// Cells whose cache was created just now.
    pub spawned: Vec<Cell>,
    /// Known caches that came back into view.
    pub restored: Vec<Cell>,
    /// Caches that left the window; their contents stay in the store.
    pub evicted: Vec<Cell>,
}

impl WindowDiff {
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty() && self.restored.is_empty() && self.evicted.is_empty()
    }

    /// Cells that need a rectangle drawn.
    pub fn rendered(&self) -> impl Iterator<Item = Cell> + '_ {
        self.spawned.iter().chain(&self.restored).copied()
    }
}

/// Player action or sensor event, applied one at a time through [`GameSession::apply`].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Step(Direction),
    MoveBy { dlat: f64, dlng: f64 },
    MoveTo(LatLng),
    Collect(Cell),
    Deposit(Cell),
    Reset,
    SensorFailed(SensorError),
}

#[derive(Clone, Debug, PartialEq)]
pub enum CommandOutcome {
    Moved(WindowDiff),
    Transfer(TransferOutcome),
    Reset(WindowDiff),
    Ignored,
}

impl CommandOutcome {
    pub fn has_update(&self) -> bool {
        match self {
            Self::Moved(diff) | Self::Reset(diff) => !diff.is_empty(),
            Self::Transfer(outcome) => outcome.has_update(),
            Self::Ignored => false,
        }
    }
}

/// One player's game: position, wallet, movement trail and every cache they have seen.
///
/// Each cell of the visibility window is in one of three states. It is unknown when the store has no entry for it,
/// known-inactive when the store has an entry but the cache is not rendered, and known-active when it is rendered.
/// [`refresh`](Self::refresh) moves cells between those states whenever the window changes. The memento store is the
/// single source of truth for cache contents; active caches mirror it after every mutation.
///
/// Every mutating operation saves a [`SessionSnapshot`] into the storage once the in-memory change is complete.
#[derive(Debug)]
pub struct GameSession<L: Luck = SeededLuck, S: SnapshotStorage = MemoryStorage> {
    config: GameConfig,
    luck: L,
    storage: S,
    registry: CellRegistry,
    store: CacheStateStore,
    active: BTreeMap<Cell, Cache>,
    position: LatLng,
    wallet: Vec<Coin>,
    history: Vec<LatLng>,
}

impl<L: Luck, S: SnapshotStorage> GameSession<L, S> {
    /// Fresh session at the configured start, ignoring anything already in storage.
    pub fn new(config: GameConfig, luck: L, storage: S) -> Self {
        let config = config.sanitized();
        let mut session = Self {
            config,
            luck,
            storage,
            registry: CellRegistry::new(),
            store: CacheStateStore::new(),
            active: BTreeMap::new(),
            position: config.start,
            wallet: Vec::new(),
            history: vec![config.start],
        };
        session.refresh();
        session
    }

    /// Resumes the session saved in `storage`, or starts a fresh one when there is none or it can't be read.
    pub fn restore(config: GameConfig, luck: L, storage: S) -> Self {
        let snapshot = match storage.load(SessionSnapshot::KEY) {
            Ok(Some(json)) => match SessionSnapshot::from_json(&json) {
                Ok(snapshot) => Some(snapshot),
                Err(err) => {
                    log::warn!("Discarding saved session: {err}");
                    None
                }
            },
            Ok(None) => {
                log::debug!("no saved session");
                None
            }
            Err(err) => {
                log::warn!("Could not read saved session: {err}");
                None
            }
        };

        match snapshot {
            Some(snapshot) => Self::from_snapshot(config, luck, storage, snapshot),
            None => Self::new(config, luck, storage),
        }
    }

    /// Session rebuilt from `snapshot`, falling back to a fresh one if the snapshot is inconsistent.
    pub fn from_snapshot(
        config: GameConfig,
        luck: L,
        storage: S,
        snapshot: SessionSnapshot,
    ) -> Self {
        let config = config.sanitized();
        let store = match snapshot.cache_state_store() {
            Ok(store) => store,
            Err(err) => {
                log::warn!("Discarding saved session: {err}");
                return Self::new(config, luck, storage);
            }
        };
        let Some(position) = snapshot.last_position() else {
            log::warn!("Discarding saved session: {}", SnapshotError::EmptyHistory);
            return Self::new(config, luck, storage);
        };

        let mut session = Self {
            config,
            luck,
            storage,
            registry: CellRegistry::new(),
            store,
            active: BTreeMap::new(),
            position,
            wallet: snapshot.player_wallet,
            history: snapshot.movement_history,
        };
        log::info!(
            "restored session at {} with {} wallet coins and {} known caches",
            session.position,
            session.wallet.len(),
            session.store.len()
        );
        session.refresh();
        session
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn player_cell(&mut self) -> CellRef {
        self.registry
            .cell_for_point(self.position, self.config.tile_width)
    }

    pub fn wallet(&self) -> &[Coin] {
        &self.wallet
    }

    pub fn history(&self) -> &[LatLng] {
        &self.history
    }

    pub fn store(&self) -> &CacheStateStore {
        &self.store
    }

    /// Rendered caches in cell order.
    pub fn active_caches(&self) -> impl Iterator<Item = &Cache> {
        self.active.values()
    }

    pub fn active_cache(&self, cell: Cell) -> Option<&Cache> {
        self.active.get(&cell)
    }

    pub fn is_active(&self, cell: Cell) -> bool {
        self.active.contains_key(&cell)
    }

    /// Coins in the wallet plus coins in every known cache, rendered or not.
    pub fn total_coins(&self) -> usize {
        self.wallet.len() + self.store.total_coins()
    }

    /// Rectangle to draw for `cell`.
    pub fn bounds_of(&self, cell: Cell) -> Bounds {
        cell_bounds(cell, self.config.tile_width)
    }

    /// Single entry point for the event queue.
    pub fn apply(&mut self, command: Command) -> Result<CommandOutcome> {
        use Command::*;

        Ok(match command {
            Step(direction) => CommandOutcome::Moved(self.step(direction)),
            MoveBy { dlat, dlng } => CommandOutcome::Moved(self.move_by(dlat, dlng)),
            MoveTo(point) => CommandOutcome::Moved(self.move_to(point)),
            Collect(cell) => CommandOutcome::Transfer(self.collect(cell)?),
            Deposit(cell) => CommandOutcome::Transfer(self.deposit(cell)?),
            Reset => CommandOutcome::Reset(self.reset()),
            SensorFailed(err) => {
                self.apply_sample(Err(err));
                CommandOutcome::Ignored
            }
        })
    }

    /// Moves to the centre of the neighboring cell in `direction`.
    pub fn step(&mut self, direction: Direction) -> WindowDiff {
        let cell = *self.player_cell();
        let (di, dj) = direction.offset();
        let next = Cell::new(cell.i.saturating_add(di), cell.j.saturating_add(dj));
        self.move_to(LatLng::center_of(next, self.config.tile_width))
    }

    pub fn move_by(&mut self, dlat: f64, dlng: f64) -> WindowDiff {
        self.move_to(self.position.offset(dlat, dlng))
    }

    /// Moves the player to `point`. Non-finite or off-globe points are dropped and the player stays put.
    pub fn move_to(&mut self, point: LatLng) -> WindowDiff {
        if !point.is_valid() {
            log::warn!("Ignoring invalid position {point}, staying at {}", self.position);
            return WindowDiff::default();
        }
        log::debug!("move {} -> {}", self.position, point);
        self.position = point;
        self.history.push(point);
        let diff = self.refresh();
        self.save();
        diff
    }

    /// Handles a sensor reading; failures keep the last known position.
    pub fn apply_sample(&mut self, sample: PositionSample) -> WindowDiff {
        match sample {
            Ok(point) => self.move_to(point),
            Err(err) => {
                log::warn!("Position update failed, staying at {}: {err}", self.position);
                WindowDiff::default()
            }
        }
    }

    /// Recomputes the visibility window, spawning, restoring and evicting caches as needed.
    pub fn refresh(&mut self) -> WindowDiff {
        let visible = cells_near(
            &mut self.registry,
            self.position,
            self.config.tile_width,
            self.config.visibility_radius,
        );
        let visible_set: BTreeSet<Cell> = visible.iter().map(|cell| **cell).collect();
        let mut diff = WindowDiff::default();

        let leaving: Vec<Cell> = self
            .active
            .keys()
            .filter(|cell| !visible_set.contains(cell))
            .copied()
            .collect();
        for cell in leaving {
            self.active.remove(&cell);
            diff.evicted.push(cell);
        }

        for cell in visible.iter().map(|cell| **cell) {
            if self.active.contains_key(&cell) {
                continue;
            }

            if let Some(coins) = self.store.get(cell) {
                self.active.insert(cell, Cache::restore(cell, coins));
                diff.restored.push(cell);
            } else if let Some(cache) = self.spawn(cell) {
                self.store.set(cell, cache.coins().to_vec());
                self.active.insert(cell, cache);
                diff.spawned.push(cell);
            }
        }

        log::debug!(
            "refresh at {}: {} spawned, {} restored, {} evicted, {} active",
            self.position,
            diff.spawned.len(),
            diff.restored.len(),
            diff.evicted.len(),
            self.active.len()
        );
        self.debug_check_mirror();
        diff
    }

    /// Cache for an unknown cell, if its luck is under the spawn threshold.
    fn spawn(&self, cell: Cell) -> Option<Cache> {
        let luck = self.luck.luck(&cell.key());
        if luck < self.config.spawn_probability {
            let cache = Cache::spawn(cell, coin_count_for(luck, self.config.coin_scale));
            log::trace!("spawned cache at {cell} with {} coins", cache.len());
            Some(cache)
        } else {
            None
        }
    }

    /// Moves the top coin of the cache at `cell` into the wallet.
    pub fn collect(&mut self, cell: Cell) -> Result<TransferOutcome> {
        let cache = self
            .active
            .get_mut(&cell)
            .ok_or(GameError::CacheNotActive(cell))?;
        let Some(coin) = cache.take() else {
            log::debug!("nothing to collect at {cell}");
            return Ok(TransferOutcome::NoChange);
        };

        self.wallet.push(coin);
        self.store.set(cell, cache.coins().to_vec());
        let cache_coins = cache.len();
        log::info!("collected {coin}");

        self.debug_check_mirror();
        self.save();
        Ok(TransferOutcome::Moved {
            coin,
            cache_coins,
            wallet_coins: self.wallet.len(),
        })
    }

    /// Moves the top wallet coin into the cache at `cell`.
    pub fn deposit(&mut self, cell: Cell) -> Result<TransferOutcome> {
        let cache = self
            .active
            .get_mut(&cell)
            .ok_or(GameError::CacheNotActive(cell))?;
        let Some(coin) = self.wallet.pop() else {
            log::debug!("wallet empty, nothing to deposit at {cell}");
            return Ok(TransferOutcome::NoChange);
        };

        cache.put(coin);
        self.store.set(cell, cache.coins().to_vec());
        let cache_coins = cache.len();
        log::info!("deposited {coin} at {cell}");

        self.debug_check_mirror();
        self.save();
        Ok(TransferOutcome::Moved {
            coin,
            cache_coins,
            wallet_coins: self.wallet.len(),
        })
    }

    /// Returns the player to the start with an empty wallet and a fresh trail.
    ///
    /// Every rendered cache is evicted, then the window at the start location is rendered again. What happens to cache
    /// contents depends on [`ResetPolicy`]. Resetting twice in a row leaves the same state as resetting once.
    pub fn reset(&mut self) -> WindowDiff {
        let evicted: Vec<Cell> = self.active.keys().copied().collect();
        self.active.clear();
        self.wallet.clear();
        match self.config.reset_policy {
            ResetPolicy::RestoreSpawned => {
                self.store.clear();
                self.registry.clear();
            }
            ResetPolicy::KeepCaches => {}
        }
        self.position = self.config.start;
        self.history.clear();
        self.history.push(self.config.start);
        log::info!("session reset ({:?})", self.config.reset_policy);

        let rendered = self.refresh();
        self.save();
        WindowDiff {
            evicted,
            ..rendered
        }
    }

    fn save(&mut self) {
        let json = match SessionSnapshot::capture(self).to_json() {
            Ok(json) => json,
            Err(err) => {
                log::error!("Could not encode session: {err}");
                return;
            }
        };
        if let Err(err) = self.storage.save(SessionSnapshot::KEY, &json) {
            log::error!("Could not save session: {err}");
        }
    }

    fn debug_check_mirror(&self) {
        debug_assert!(
            self.active
                .iter()
                .all(|(&cell, cache)| self.store.get(cell) == Some(cache.coins())),
            "rendered caches diverged from the cache state store"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: f64 = 1e-4;

    /// Luck that makes exactly the listed cells lucky, with the given luck values.
    fn luck_table(lucky: &[(Cell, f64)]) -> impl Fn(&str) -> f64 + use<> {
        let table: BTreeMap<String, f64> = lucky
            .iter()
            .map(|(cell, luck)| (cell.key(), *luck))
            .collect();
        move |key: &str| table.get(key).copied().unwrap_or(0.99)
    }

    fn origin() -> Cell {
        Cell::new(369894, -1220627)
    }

    fn config(radius: Coord) -> GameConfig {
        GameConfig::default().with_radius(radius)
    }

    fn session_with(
        config: GameConfig,
        lucky: &[(Cell, f64)],
    ) -> (
        GameSession<impl Fn(&str) -> f64 + use<>, MemoryStorage>,
        MemoryStorage,
    ) {
        let storage = MemoryStorage::new();
        let session = GameSession::new(config, luck_table(lucky), storage.clone());
        (session, storage)
    }

    fn serials(coins: &[Coin]) -> Vec<Serial> {
        coins.iter().map(|coin| coin.serial).collect()
    }

    fn contents<L: Luck>(session: &GameSession<L, MemoryStorage>) -> Vec<(Cell, Vec<Coin>)> {
        session
            .active_caches()
            .map(|cache| (cache.location(), cache.coins().to_vec()))
            .collect()
    }

    fn saved(storage: &MemoryStorage) -> SessionSnapshot {
        SessionSnapshot::from_json(&storage.get(SessionSnapshot::KEY).unwrap()).unwrap()
    }

    #[test]
    fn lucky_cell_spawns_floor_of_luck_coins() {
        let (session, _) = session_with(config(1), &[(origin(), 0.05)]);

        let cache = session.active_cache(origin()).unwrap();

        assert_eq!(serials(cache.coins()), [0, 1, 2, 3, 4]);
        assert_eq!(session.store().get(origin()), Some(cache.coins()));
        assert_eq!(session.active_caches().count(), 1);
    }

    #[test]
    fn luck_at_threshold_does_not_spawn() {
        let (session, _) = session_with(config(0), &[(origin(), 0.1)]);

        assert!(!session.is_active(origin()));
        assert!(session.store().is_empty());
    }

    #[test]
    fn collect_moves_top_coin_to_wallet_and_store() {
        let (mut session, storage) = session_with(config(0), &[(origin(), 0.03)]);

        let outcome = session.collect(origin()).unwrap();

        assert_eq!(
            outcome,
            TransferOutcome::Moved {
                coin: Coin::new(origin(), 2),
                cache_coins: 2,
                wallet_coins: 1,
            }
        );
        assert_eq!(session.wallet(), [Coin::new(origin(), 2)]);
        assert_eq!(serials(session.store().get(origin()).unwrap()), [0, 1]);
        assert_eq!(saved(&storage).player_wallet, session.wallet());
    }

    #[test]
    fn deposit_pushes_last_wallet_coin() {
        let other = Cell::new(origin().i, origin().j + 1);
        let (mut session, _) = session_with(config(1), &[(origin(), 0.02), (other, 0.01)]);

        session.collect(origin()).unwrap();
        session.collect(origin()).unwrap();
        let outcome = session.deposit(other).unwrap();

        assert_eq!(outcome.coin(), Some(Coin::new(origin(), 0)));
        assert_eq!(session.wallet(), [Coin::new(origin(), 1)]);
        assert_eq!(
            session.store().get(other).unwrap(),
            [Coin::new(other, 0), Coin::new(origin(), 0)]
        );
        assert_eq!(
            session.active_cache(other).unwrap().top(),
            Some(&Coin::new(origin(), 0))
        );
    }

    #[test]
    fn empty_cache_and_empty_wallet_are_no_ops() {
        let (mut session, storage) = session_with(config(0), &[(origin(), 0.001)]);

        assert_eq!(session.collect(origin()).unwrap(), TransferOutcome::NoChange);
        assert_eq!(session.deposit(origin()).unwrap(), TransferOutcome::NoChange);
        assert!(session.is_active(origin()));
        assert_eq!(storage.get(SessionSnapshot::KEY), None);
    }

    #[test]
    fn transfers_need_a_rendered_cache() {
        let (mut session, _) = session_with(config(0), &[]);
        let far = Cell::new(0, 0);

        assert_eq!(session.collect(far), Err(GameError::CacheNotActive(far)));
        assert_eq!(session.deposit(far), Err(GameError::CacheNotActive(far)));
    }

    #[test]
    fn evicted_cache_restores_with_collected_state() {
        let (mut session, _) = session_with(config(1), &[(origin(), 0.04)]);
        session.collect(origin()).unwrap();

        let mut evicted = WindowDiff::default();
        for _ in 0..3 {
            let diff = session.step(Direction::East);
            evicted.evicted.extend(diff.evicted);
        }
        assert_eq!(evicted.evicted, [origin()]);
        assert!(!session.is_active(origin()));
        assert!(session.store().has(origin()));

        let mut restored = Vec::new();
        for _ in 0..3 {
            restored.extend(session.step(Direction::West).restored);
        }

        assert_eq!(restored, [origin()]);
        let cache = session.active_cache(origin()).unwrap();
        assert_eq!(serials(cache.coins()), [0, 1, 2]);
        assert_eq!(session.total_coins(), 4);
    }

    #[test]
    fn coins_are_conserved_across_transfers_and_moves() {
        let neighbor = Cell::new(origin().i + 1, origin().j);
        let (mut session, _) = session_with(config(2), &[(origin(), 0.07), (neighbor, 0.09)]);
        let spawned = session.total_coins();
        assert_eq!(spawned, 16);

        for round in 0..5 {
            session.collect(origin()).unwrap();
            session.collect(neighbor).unwrap();
            if round % 2 == 0 {
                session.deposit(origin()).unwrap();
            }
            session.step(Direction::North);
            session.step(Direction::South);
            assert_eq!(session.total_coins(), spawned);
        }
        for _ in 0..10 {
            session.step(Direction::West);
        }
        session.step(Direction::South);

        assert_eq!(session.active_caches().count(), 0);
        assert_eq!(session.total_coins(), spawned);
    }

    #[test]
    fn window_diff_lists_spawn_then_evict() {
        let east = Cell::new(origin().i, origin().j + 2);
        let (mut session, _) = session_with(config(1), &[(east, 0.05)]);
        assert!(!session.is_active(east));

        let diff = session.step(Direction::East);
        assert_eq!(diff.spawned, [east]);
        assert_eq!(diff.rendered().collect::<Vec<_>>(), [east]);

        let diff = session.step(Direction::West);
        assert_eq!(diff.evicted, [east]);
        assert!(diff.spawned.is_empty() && diff.restored.is_empty());
    }

    #[test]
    fn same_luck_and_start_spawn_same_caches() {
        let config = config(4);
        let a = GameSession::new(config, SeededLuck::new(99), MemoryStorage::new());
        let b = GameSession::new(config, SeededLuck::new(99), MemoryStorage::new());

        let caches = |session: &GameSession| -> Vec<(Cell, usize)> {
            session
                .active_caches()
                .map(|cache| (cache.location(), cache.len()))
                .collect()
        };

        assert_eq!(caches(&a), caches(&b));
        assert_eq!(a.store(), b.store());
    }

    #[test]
    fn floor_maps_negative_positions_to_enclosing_cell() {
        let config = config(0).with_start(LatLng::new(-0.00005, -0.00005));
        let (mut session, _) = session_with(config, &[]);

        assert_eq!(*session.player_cell(), Cell::new(-1, -1));
    }

    #[test]
    fn movement_is_appended_to_history() {
        let (mut session, _) = session_with(config(0), &[]);

        session.step(Direction::North);
        session.move_to(LatLng::new(1., 2.));

        assert_eq!(session.history().len(), 3);
        assert_eq!(session.history()[0], DEFAULT_START);
        assert_eq!(session.position(), LatLng::new(1., 2.));
        assert_eq!(session.history().last(), Some(&LatLng::new(1., 2.)));
    }

    #[test]
    fn sensor_failure_keeps_position() {
        let (mut session, _) = session_with(config(0), &[]);

        let diff = session.apply_sample(Err(SensorError::Unavailable));

        assert!(diff.is_empty());
        assert_eq!(session.position(), DEFAULT_START);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn sensor_sample_moves_player() {
        let (mut session, _) = session_with(config(0), &[]);

        session.apply_sample(Ok(LatLng::new(10., 10.)));

        assert_eq!(session.position(), LatLng::new(10., 10.));
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn steps_move_exactly_one_cell() {
        let (mut session, _) = session_with(config(0), &[]);

        for n in 1..=5 {
            session.step(Direction::South);
            assert_eq!(*session.player_cell(), Cell::new(origin().i - n, origin().j));
        }
        for n in 1..=5 {
            session.step(Direction::East);
            assert_eq!(*session.player_cell(), Cell::new(origin().i - 5, origin().j + n));
        }
        for _ in 0..5 {
            session.step(Direction::North);
            session.step(Direction::West);
        }

        assert_eq!(*session.player_cell(), origin());
    }

    #[test]
    fn non_finite_position_is_ignored() {
        let (mut session, storage) = session_with(config(1), &[(origin(), 0.03)]);
        session.collect(origin()).unwrap();

        let diff = session.move_to(LatLng::new(f64::NAN, 0.));
        assert!(diff.is_empty());
        let diff = session.apply_sample(Ok(LatLng::new(0., f64::INFINITY)));
        assert!(diff.is_empty());

        assert_eq!(session.position(), DEFAULT_START);
        assert_eq!(session.history(), [DEFAULT_START]);
        let restored = GameSession::restore(config(1), luck_table(&[(origin(), 0.03)]), storage);
        assert_eq!(restored.wallet().len(), 1);
        assert_eq!(restored.wallet(), session.wallet());
    }

    #[test]
    fn off_globe_position_is_ignored() {
        let (mut session, _) = session_with(config(2), &[]);

        let diff = session.move_to(LatLng::new(1.0e6, 0.));
        let moved = session.apply(Command::MoveBy { dlat: 0., dlng: -400. }).unwrap();

        assert!(diff.is_empty());
        assert!(!moved.has_update());
        assert_eq!(session.position(), DEFAULT_START);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn invalid_config_is_sanitized() {
        let config = GameConfig {
            tile_width: 0.,
            visibility_radius: -5,
            ..GameConfig::default()
        };
        let (mut session, _) = session_with(config, &[]);

        assert_eq!(session.config().tile_width, TILE);
        assert_eq!(session.config().visibility_radius, 0);
        assert_eq!(*session.player_cell(), origin());
    }

    #[test]
    fn apply_dispatches_commands() {
        let (mut session, _) = session_with(config(0), &[(origin(), 0.02)]);

        let outcome = session.apply(Command::Collect(origin())).unwrap();
        assert!(outcome.has_update());

        let outcome = session.apply(Command::SensorFailed(SensorError::Timeout)).unwrap();
        assert_eq!(outcome, CommandOutcome::Ignored);

        let outcome = session.apply(Command::MoveBy { dlat: 0., dlng: 0. }).unwrap();
        assert!(!outcome.has_update());

        assert!(session.apply(Command::Deposit(Cell::new(1, 1))).is_err());
    }

    #[test]
    fn save_then_restore_reproduces_session() {
        let east = Cell::new(origin().i, origin().j + 1);
        let lucky = [(origin(), 0.06), (east, 0.02)];
        let (mut session, storage) = session_with(config(1), &lucky);
        session.collect(origin()).unwrap();
        session.collect(east).unwrap();
        session.step(Direction::North);
        session.deposit(origin()).unwrap();

        let restored = GameSession::restore(config(1), luck_table(&lucky), storage.clone());

        assert_eq!(restored.wallet(), session.wallet());
        assert_eq!(restored.store(), session.store());
        assert_eq!(restored.history(), session.history());
        assert_eq!(restored.position(), session.position());
        assert_eq!(contents(&restored).len(), 2);
        assert_eq!(contents(&restored), contents(&session));
    }

    #[test]
    fn malformed_save_starts_fresh() {
        let mut storage = MemoryStorage::new();
        storage.save(SessionSnapshot::KEY, "{not json").unwrap();

        let session = GameSession::restore(config(0), luck_table(&[]), storage);

        assert_eq!(session.position(), DEFAULT_START);
        assert_eq!(session.history().len(), 1);
        assert!(session.wallet().is_empty());
    }

    #[test]
    fn missing_save_starts_fresh() {
        let session = GameSession::restore(config(0), luck_table(&[]), MemoryStorage::new());

        assert_eq!(session.history(), [DEFAULT_START]);
        assert!(session.store().is_empty());
    }

    #[test]
    fn reset_restores_spawned_caches() {
        let (mut session, storage) = session_with(config(1), &[(origin(), 0.05)]);
        session.collect(origin()).unwrap();
        session.collect(origin()).unwrap();
        session.step(Direction::North);

        let diff = session.reset();

        assert_eq!(diff.evicted, [origin()]);
        assert_eq!(diff.spawned, [origin()]);
        assert!(session.wallet().is_empty());
        assert_eq!(session.history(), [DEFAULT_START]);
        assert_eq!(session.position(), DEFAULT_START);
        assert_eq!(
            serials(session.active_cache(origin()).unwrap().coins()),
            [0, 1, 2, 3, 4]
        );
        assert_eq!(session.total_coins(), 5);

        let snapshot = saved(&storage);
        assert!(snapshot.player_wallet.is_empty());
        assert_eq!(snapshot.movement_history, [DEFAULT_START]);
        assert_eq!(snapshot.cache_states.len(), 1);
    }

    #[test]
    fn reset_keeping_caches_drops_wallet_coins() {
        let config = config(1).with_reset_policy(ResetPolicy::KeepCaches);
        let (mut session, storage) = session_with(config, &[(origin(), 0.05)]);
        session.collect(origin()).unwrap();
        session.collect(origin()).unwrap();

        let diff = session.reset();

        assert_eq!(diff.evicted, [origin()]);
        assert_eq!(diff.restored, [origin()]);
        assert!(session.wallet().is_empty());
        assert_eq!(serials(session.active_cache(origin()).unwrap().coins()), [0, 1, 2]);
        assert_eq!(session.total_coins(), 3);
        assert_eq!(saved(&storage).cache_states[0].1.len(), 3);
    }

    #[test]
    fn reset_is_idempotent() {
        let (mut session, storage) = session_with(config(1), &[(origin(), 0.05)]);
        session.collect(origin()).unwrap();
        session.step(Direction::East);

        session.reset();
        let first = saved(&storage);
        session.reset();

        assert_eq!(saved(&storage), first);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.active_caches().count(), 1);
    }
}
