use smallvec::SmallVec;

use crate::encoding::Error;

/// The containers on the path from the root to the value currently being encoded.
///
/// A container that shows up twice on the path contains itself. One that shows up in two
/// sibling branches is merely shared and gets encoded twice.
#[derive(Default, Debug)]
pub(crate) struct CycleGuard {
    active: SmallVec<[usize; 8]>,
}

impl CycleGuard {
    pub fn enter(&mut self, identity: usize) -> Result<(), Error> {
        if self.active.contains(&identity) {
            return Err(Error::CircularReference);
        }
        self.active.push(identity);
        Ok(())
    }

    pub fn exit(&mut self, identity: usize) {
        debug_assert_eq!(self.active.last(), Some(&identity));
        self.active.pop();
    }
}
