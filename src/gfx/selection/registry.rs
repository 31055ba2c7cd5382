use crate::gfx::scene::graph::NodeHandle;

/// Shared store of highlighted mesh handles
///
/// The handle sequence only changes through [`SelectionRegistry::set_selected`],
/// whose updater always sees the latest sequence, so several adapters
/// mutating in the same pass compose in order instead of overwriting each
/// other.
#[derive(Debug, Clone)]
pub struct SelectionRegistry {
    selected: Vec<NodeHandle>,
    enabled: bool,
    revision: u64,
}

impl SelectionRegistry {
    pub fn new() -> Self {
        Self {
            selected: Vec::new(),
            enabled: true,
            revision: 0,
        }
    }

    pub fn selected(&self) -> &[NodeHandle] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.selected.contains(&handle)
    }

    /// Replaces the sequence with `updater(current)`
    ///
    /// Duplicates produced by the updater are dropped, keeping the first
    /// occurrence. Returns true when the sequence actually changed.
    pub fn set_selected<F>(&mut self, updater: F) -> bool
    where
        F: FnOnce(&[NodeHandle]) -> Vec<NodeHandle>,
    {
        let proposed = updater(&self.selected);
        let mut next = Vec::with_capacity(proposed.len());
        for handle in proposed {
            if next.contains(&handle) {
                log::warn!("dropping duplicate selection entry {}", handle);
                continue;
            }
            next.push(handle);
        }

        if next == self.selected {
            return false;
        }
        self.selected = next;
        self.revision += 1;
        log::trace!(
            "selection revision {}: {} handle(s)",
            self.revision,
            self.selected.len()
        );
        true
    }

    pub fn clear(&mut self) -> bool {
        self.set_selected(|_| Vec::new())
    }

    /// Gate read by the highlight effect; does not touch the sequence
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.revision += 1;
        }
    }

    /// Bumped on every effective change of the sequence or the gate
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for SelectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
