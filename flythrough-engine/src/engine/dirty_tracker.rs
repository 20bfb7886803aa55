/// Throttled change detector for values owned by someone else.
///
/// The tracker keeps a snapshot of the watched value and, at most once per
/// `interval` milliseconds after the last acknowledged change, compares the
/// current value against it. Owners poll `dirty()` and call `update()` once
/// they have consumed the change.
///
/// Comparison and copy are injected so non-trivial types (matrices, vectors
/// compared bit for bit) can be tracked without extra trait bounds.
pub struct DirtyTracker<T> {
    interval: f32,
    equals: fn(&T, &T) -> bool,
    create: fn() -> T,
    copy: fn(&T, &mut T),
    cache: Option<T>,
    dirty: bool,
    time: f32,
    next_check: f32,
}

impl<T> DirtyTracker<T> {
    pub fn new(
        interval: f32,
        equals: fn(&T, &T) -> bool,
        create: fn() -> T,
        copy: fn(&T, &mut T),
    ) -> Self {
        Self {
            interval,
            equals,
            create,
            copy,
            cache: None,
            dirty: false,
            time: 0.0,
            next_check: 0.0,
        }
    }

    /// Advance the tracker by `delta` milliseconds and compare `current`
    /// against the snapshot once the check window has opened.
    pub fn on_tick(&mut self, delta: f32, current: &T) {
        self.time += delta;

        if !self.dirty && self.time > self.next_check {
            let create = self.create;
            let cache = self.cache.get_or_insert_with(create);
            self.dirty = !(self.equals)(current, cache);
        }
    }

    /// Acknowledge a change: snapshot `current` and close the check window
    /// for another `interval`. Does nothing while clean.
    pub fn update(&mut self, current: &T) {
        if !self.dirty {
            return;
        }

        let create = self.create;
        let cache = self.cache.get_or_insert_with(create);
        (self.copy)(current, cache);
        self.next_check = self.time + self.interval;
        self.dirty = false;
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    /// Last acknowledged snapshot, if the tracker has checked at least once.
    pub fn snapshot(&self) -> Option<&T> {
        self.cache.as_ref()
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }
}

impl<T: PartialEq + Clone + Default> DirtyTracker<T> {
    /// Tracker using `PartialEq`, `Default` and `Clone` for the injected hooks.
    pub fn with_interval(interval: f32) -> Self {
        Self::new(
            interval,
            |a, b| a == b,
            T::default,
            |from, to| to.clone_from(from),
        )
    }
}

impl<T> std::fmt::Debug for DirtyTracker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirtyTracker")
            .field("interval", &self.interval)
            .field("dirty", &self.dirty)
            .field("time", &self.time)
            .field("next_check", &self.next_check)
            .finish()
    }
}
