// naive algorithm computing dominator tree with complexity O(n*m)
// Ref: https://blog.csdn.net/Dong_HFUT/article/details/121375025?spm=1001.2014.3001.5501

use std::collections::{HashMap, HashSet, VecDeque};

use llvm::BlockId;

use crate::cfg::CFG;

fn reachable_without(cfg: &CFG, removed: Option<BlockId>) -> HashSet<BlockId> {
	let mut reachable = HashSet::new();
	let mut worklist = VecDeque::new();
	if removed != Some(cfg.get_entry()) {
		worklist.push_back(cfg.get_entry());
	}
	while let Some(bb) = worklist.pop_front() {
		if !reachable.insert(bb) {
			continue;
		}
		for succ in cfg.block(bb).succ.iter() {
			if Some(*succ) != removed {
				worklist.push_back(*succ);
			}
		}
	}
	reachable
}

pub fn compute_dominator(
	cfg: &CFG,
	reachable: &mut HashSet<BlockId>,
	dominates: &mut HashMap<BlockId, HashSet<BlockId>>,
	dominates_directly: &mut HashMap<BlockId, Vec<BlockId>>,
	dominator: &mut HashMap<BlockId, BlockId>,
) {
	// 从 entry 出发到不了的块不参与计算
	*reachable = reachable_without(cfg, None);
	let mut order: Vec<_> = reachable.iter().copied().collect();
	order.sort();
	for bb in order.iter() {
		// 尝试将这个 bb 从图中移除，移除后无法访问的节点是被它支配的节点
		let left = reachable_without(cfg, Some(*bb));
		let dominated = order.iter().filter(|x| !left.contains(x)).copied();
		dominates.insert(*bb, dominated.collect());
	}
	// 计算完dominates后，计算dominates_directly
	for bb in order.iter() {
		let mut inner: Vec<_> = dominates[bb].iter().copied().collect();
		inner.sort();
		for bb_inner in inner {
			if bb_inner == *bb {
				continue;
			}
			match dominator.get(&bb_inner).copied() {
				// 如果bb_inner没有支配者
				None => {
					dominator.insert(bb_inner, *bb);
				}
				// 如果bb_inner的支配者支配了bb, bb 离 bb_inner 更近
				Some(old) if dominates[&old].contains(bb) => {
					dominator.insert(bb_inner, *bb);
				}
				_ => {}
			}
		}
	}
	for bb in order.iter() {
		if let Some(idom) = dominator.get(bb) {
			dominates_directly.entry(*idom).or_default().push(*bb);
		}
	}
}
