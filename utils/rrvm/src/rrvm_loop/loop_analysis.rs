use log::trace;

use llvm::BlockId;

use crate::{cfg::CFG, dominator::DomTree};

use super::{utils::find_preheader, Loop, LoopForest, LoopId};

impl CFG {
	pub fn loop_analysis(&self) -> LoopForest {
		let dom_tree = DomTree::new(self);
		let mut forest = LoopForest::default();
		loop_dfs(self.get_entry(), self, &dom_tree, &mut forest);
		for id in 0..forest.loops.len() {
			calc_loop_level(&mut forest, LoopId(id as u32));
			if let Some(outer) = forest.loops[id].outer {
				forest.loops[outer.index()].subloops.push(LoopId(id as u32));
			}
		}
		// 块按编号顺序记进所有包含它的循环
		for bb in self.blocks.iter() {
			let mut cur = forest.innermost(bb.id);
			while let Some(l) = cur {
				forest.loops[l.index()].blocks.push(bb.id);
				cur = forest.get(l).outer;
			}
		}
		for id in 0..forest.loops.len() {
			let preheader = find_preheader(self, &forest, LoopId(id as u32));
			forest.loops[id].preheader = preheader;
			trace!("loop L{}: {}", id, forest.loops[id]);
		}
		forest
	}
}

fn calc_loop_level(forest: &mut LoopForest, loop_: LoopId) -> i32 {
	if forest.get(loop_).level != -1 {
		return forest.get(loop_).level;
	}
	let level = match forest.get(loop_).outer {
		Some(outer) => calc_loop_level(forest, outer) + 1,
		None => 1,
	};
	forest.loops[loop_.index()].level = level;
	level
}

// dfs on dom tree, 内层循环先被发现
fn loop_dfs(
	cur_bb: BlockId,
	cfg: &CFG,
	dom_tree: &DomTree,
	forest: &mut LoopForest,
) {
	for next in dom_tree.get_children(cur_bb) {
		loop_dfs(*next, cfg, dom_tree, forest);
	}
	// 看看自己的前驱有没有被自己支配的，有的话就有循环存在，与自己前驱之间的边就是 backedge
	let mut bbs: Vec<_> = cfg
		.block(cur_bb)
		.prev
		.iter()
		.filter(|prev| dom_tree.dominates(cur_bb, **prev))
		.copied()
		.collect();
	if bbs.is_empty() {
		return;
	}
	let new_loop = LoopId(forest.loops.len() as u32);
	let mut loop_ = Loop::new(new_loop, cur_bb);
	loop_.back_edges = bbs.clone();
	forest.loops.push(loop_);
	trace!("found loop L{} with header {}", new_loop.0, cur_bb);

	let reachable_prev = |bb: BlockId| -> Vec<BlockId> {
		let prev = cfg.block(bb).prev.iter();
		prev.filter(|p| dom_tree.is_reachable(**p)).copied().collect()
	};
	while let Some(bb) = bbs.pop() {
		match forest.innermost(bb) {
			None => {
				forest.loop_map.insert(bb, new_loop);
				if bb != cur_bb {
					bbs.extend(reachable_prev(bb));
				}
			}
			Some(inner_loop) => {
				let inner_loop = forest.outermost(inner_loop);
				if inner_loop == new_loop {
					continue;
				}
				forest.loops[new_loop.index()].no_inner = false;
				forest.loops[inner_loop.index()].outer = Some(new_loop);
				bbs.extend(reachable_prev(forest.get(inner_loop).header));
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use llvm::*;

	use crate::func::LlvmFunc;

	fn jump(func: &mut LlvmFunc, from: BlockId, to: BlockId) {
		func.set_jump(from, LlvmInstr::Jump(JumpInstr { target: to }));
	}

	fn branch(func: &mut LlvmFunc, from: BlockId, t: BlockId, f: BlockId) {
		let cond = func.int_constant(1);
		func.set_jump(
			from,
			LlvmInstr::JumpCond(JumpCondInstr {
				cond,
				target_true: t,
				target_false: f,
			}),
		);
	}

	// entry -> outer_h -> inner_h -> inner_b -> inner_h
	//                     inner_h -> outer_b -> outer_h
	//          outer_h -> exit
	#[test]
	fn nested_loops() {
		let mut func = LlvmFunc::new("f", VarType::Void);
		let entry = func.entry();
		let outer_h = func.new_basicblock("outer_h");
		let inner_h = func.new_basicblock("inner_h");
		let inner_b = func.new_basicblock("inner_b");
		let outer_b = func.new_basicblock("outer_b");
		let exit = func.new_basicblock("exit");
		jump(&mut func, entry, outer_h);
		branch(&mut func, outer_h, inner_h, exit);
		branch(&mut func, inner_h, inner_b, outer_b);
		jump(&mut func, inner_b, inner_h);
		jump(&mut func, outer_b, outer_h);
		func.set_jump(exit, LlvmInstr::Ret(RetInstr { value: None }));

		let forest = func.cfg.loop_analysis();
		assert_eq!(forest.loops.len(), 2);
		let inner = forest.innermost(inner_b).unwrap();
		let outer = forest.innermost(outer_b).unwrap();
		assert_eq!(forest.get(inner).header, inner_h);
		assert_eq!(forest.get(outer).header, outer_h);
		assert_eq!(forest.get(inner).outer, Some(outer));
		assert_eq!(forest.get(outer).subloops, vec![inner]);
		assert_eq!(forest.get(inner).level, 2);
		assert_eq!(forest.get(outer).blocks, vec![outer_h, inner_h, inner_b, outer_b]);
		assert_eq!(forest.get(inner).back_edges, vec![inner_b]);
		assert_eq!(forest.get(outer).preheader, Some(entry));
		// inner_h 的外部前驱是 outer_h，它有两个后继
		assert_eq!(forest.get(inner).preheader, None);
		assert!(forest.contains_block(outer, inner_b));
		assert!(!forest.contains_block(inner, outer_b));
		assert!(forest.is_header(inner_h));
		assert!(!forest.is_header(exit));
		assert_eq!(forest.outer_to_inner(), vec![outer, inner]);
	}

	#[test]
	fn self_loop() {
		let mut func = LlvmFunc::new("f", VarType::Void);
		let entry = func.entry();
		let body = func.new_basicblock("body");
		let exit = func.new_basicblock("exit");
		jump(&mut func, entry, body);
		branch(&mut func, body, body, exit);
		func.set_jump(exit, LlvmInstr::Ret(RetInstr { value: None }));

		let forest = func.cfg.loop_analysis();
		assert_eq!(forest.loops.len(), 1);
		let l = forest.innermost(body).unwrap();
		assert_eq!(forest.get(l).blocks, vec![body]);
		assert_eq!(forest.get(l).back_edges, vec![body]);
		assert!(forest.innermost(exit).is_none());
	}
}
