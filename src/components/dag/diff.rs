use std::collections::HashSet;

/// Anything addressed by a string identity.
pub trait Identified {
	fn identity(&self) -> &str;
}

/// Members gained and lost between two renders. Unchanged members are omitted.
#[derive(Debug)]
pub struct Diff<'a, T> {
	pub added: Vec<&'a T>,
	pub removed: Vec<&'a T>,
}

impl<T> Diff<'_, T> {
	pub fn is_empty(&self) -> bool {
		self.added.is_empty() && self.removed.is_empty()
	}
}

/// Classify `current` against `previous` by identity.
///
/// `added` keeps the order of `current`, `removed` the order of `previous`.
pub fn diff<'a, T: Identified>(previous: &'a [T], current: &'a [T]) -> Diff<'a, T> {
	let before: HashSet<&str> = previous.iter().map(Identified::identity).collect();
	let after: HashSet<&str> = current.iter().map(Identified::identity).collect();

	Diff {
		added: current
			.iter()
			.filter(|item| !before.contains(item.identity()))
			.collect(),
		removed: previous
			.iter()
			.filter(|item| !after.contains(item.identity()))
			.collect(),
	}
}
