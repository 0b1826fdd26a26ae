use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TreeError {
	#[error("Bone {0} has no preceding bone with remaining subtree quota")]
	Orphan(usize),
}

/// Rebuilds parent links from a pre-order bone list and the subtree size
/// stored with every bone. Each size is a quota consumed by the bones that
/// follow: a bone is attached to the closest preceding bone whose quota is
/// not yet exhausted. The first bone is the root.
///
/// Returns the parents along with the quota nobody consumed.
pub fn parents_from_subtree_sizes(sizes: &[u32]) -> Result<(Vec<Option<usize>>, u32), TreeError> {
	let mut quota = sizes.to_vec();
	let mut parents = Vec::with_capacity(sizes.len());

	for i in 0..sizes.len() {
		if i == 0 {
			parents.push(None);
			continue;
		}

		match (0..i).rev().find(|&j| quota[j] > 0) {
			Some(j) => {
				quota[j] -= 1;
				parents.push(Some(j));
			},
			None => return Err(TreeError::Orphan(i)),
		}
	}

	Ok((parents, quota.iter().sum()))
}
