//! 课程顺序：基于前置关系的 Kahn 拓扑排序，平局按创建时间、再按输入顺序打破

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::scheduler::types::{Concept, CurriculumNode, PrerequisiteEdge};

/// (无时间戳, 创建时间, 输入下标)：有时间戳者在前，越早越靠前，其余按输入顺序
type ReadyKey = (bool, Option<DateTime<Utc>>, usize);

fn ready_key<T: CurriculumNode>(nodes: &[T], idx: usize) -> ReadyKey {
    let created_at = nodes[idx].created_at();
    (created_at.is_none(), created_at, idx)
}

/// 返回输入下标的课程顺序。
///
/// 只统计目标存在于输入集合中的前置边；就绪集合始终取 [`ReadyKey`] 最小者。
/// 剩余无法排出的节点（环或互相依赖）按同一键追加，保证终止且结果确定。
pub fn curriculum_order_indices<T: CurriculumNode>(nodes: &[T]) -> Vec<usize> {
    let mut index_by_id: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    for (idx, node) in nodes.iter().enumerate() {
        index_by_id.entry(node.id()).or_insert(idx);
    }

    let mut in_degree = vec![0usize; nodes.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (idx, node) in nodes.iter().enumerate() {
        for prerequisite_id in node.prerequisite_ids() {
            let Some(&prerequisite_idx) = index_by_id.get(prerequisite_id.as_str()) else {
                continue;
            };
            in_degree[idx] += 1;
            dependents[prerequisite_idx].push(idx);
        }
    }

    let mut ready: BTreeSet<ReadyKey> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(idx, _)| ready_key(nodes, idx))
        .collect();

    let mut ordered: Vec<usize> = Vec::with_capacity(nodes.len());
    let mut emitted = vec![false; nodes.len()];
    while let Some((_, _, idx)) = ready.pop_first() {
        ordered.push(idx);
        emitted[idx] = true;
        for &dependent in &dependents[idx] {
            let degree = &mut in_degree[dependent];
            *degree = degree.saturating_sub(1);
            if *degree == 0 && !emitted[dependent] {
                ready.insert(ready_key(nodes, dependent));
            }
        }
    }

    if ordered.len() != nodes.len() {
        let remaining = nodes.len() - ordered.len();
        tracing::warn!(
            remaining,
            total = nodes.len(),
            "Prerequisite graph has a cycle, appending unresolved concepts by creation order"
        );
        let mut leftovers: Vec<ReadyKey> = (0..nodes.len())
            .filter(|idx| !emitted[*idx])
            .map(|idx| ready_key(nodes, idx))
            .collect();
        leftovers.sort_unstable();
        ordered.extend(leftovers.into_iter().map(|(_, _, idx)| idx));
    }

    ordered
}

pub fn curriculum_order<T: CurriculumNode>(nodes: &[T]) -> Vec<&T> {
    curriculum_order_indices(nodes)
        .into_iter()
        .map(|idx| &nodes[idx])
        .collect()
}

pub fn order_ids<T: CurriculumNode>(nodes: &[T]) -> Vec<String> {
    curriculum_order_indices(nodes)
        .into_iter()
        .map(|idx| nodes[idx].id().to_string())
        .collect()
}

/// 概念 id -> 课程顺序位置；重复 id 取首次出现的位置
pub fn order_position_by_id<T: CurriculumNode>(ordered: &[&T]) -> HashMap<String, usize> {
    let mut positions = HashMap::with_capacity(ordered.len());
    for (pos, node) in ordered.iter().enumerate() {
        positions.entry(node.id().to_string()).or_insert(pos);
    }
    positions
}

/// 将存储层的前置边合并进概念的 prerequisite_ids（保持边的输入顺序，去重）
pub fn attach_prerequisites(concepts: &mut [Concept], edges: &[PrerequisiteEdge]) {
    let mut by_concept: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        by_concept
            .entry(edge.concept_id.as_str())
            .or_default()
            .push(edge.prerequisite_concept_id.as_str());
    }

    for concept in concepts.iter_mut() {
        let Some(prerequisites) = by_concept.get(concept.id.as_str()) else {
            continue;
        };
        for prerequisite in prerequisites {
            if !concept.prerequisite_ids.iter().any(|p| p == prerequisite) {
                concept.prerequisite_ids.push(prerequisite.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ids(concepts: &[Concept]) -> Vec<String> {
        order_ids(concepts)
    }

    #[test]
    fn prerequisites_come_first() {
        let concepts = vec![
            Concept::new("sampling").with_prerequisites(&["tokens"]),
            Concept::new("tokens"),
        ];
        assert_eq!(ids(&concepts), vec!["tokens", "sampling"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let concepts = vec![
            Concept::new("c"),
            Concept::new("a"),
            Concept::new("d").with_prerequisites(&["a"]),
            Concept::new("b"),
        ];
        // d 在 a 之后就绪，但 b 的输入下标更大，因此 d 先于 b
        assert_eq!(ids(&concepts), vec!["c", "a", "d", "b"]);
    }

    #[test]
    fn newly_ready_node_with_lower_index_is_emitted_first() {
        let concepts = vec![
            Concept::new("x").with_prerequisites(&["z"]),
            Concept::new("y"),
            Concept::new("z"),
        ];
        assert_eq!(ids(&concepts), vec!["y", "z", "x"]);
    }

    #[test]
    fn unknown_prerequisites_are_ignored() {
        let concepts = vec![
            Concept::new("a").with_prerequisites(&["missing"]),
            Concept::new("b"),
        ];
        assert_eq!(ids(&concepts), vec!["a", "b"]);
    }

    #[test]
    fn cycle_falls_back_to_input_order() {
        let concepts = vec![
            Concept::new("a").with_prerequisites(&["b"]),
            Concept::new("root"),
            Concept::new("b").with_prerequisites(&["a"]),
            Concept::new("leaf").with_prerequisites(&["root"]),
        ];
        assert_eq!(ids(&concepts), vec!["root", "leaf", "a", "b"]);
    }

    #[test]
    fn self_edge_does_not_hang() {
        let concepts = vec![
            Concept::new("loop").with_prerequisites(&["loop"]),
            Concept::new("ok"),
        ];
        assert_eq!(ids(&concepts), vec!["ok", "loop"]);
    }

    #[test]
    fn duplicate_edges_are_counted_consistently() {
        let concepts = vec![
            Concept::new("b").with_prerequisites(&["a", "a"]),
            Concept::new("a"),
        ];
        assert_eq!(ids(&concepts), vec!["a", "b"]);
    }

    #[test]
    fn creation_time_breaks_ties_before_input_order() {
        let day = |d: u32| Utc.with_ymd_and_hms(2026, 1, d, 0, 0, 0).unwrap();
        let concepts = vec![
            Concept::new("undated"),
            Concept::new("newer").with_created_at(day(5)),
            Concept::new("oldest").with_created_at(day(1)),
            Concept::new("child")
                .with_prerequisites(&["oldest"])
                .with_created_at(day(3)),
        ];
        // child 在 oldest 之后就绪，但创建时间早于 newer
        assert_eq!(ids(&concepts), vec!["oldest", "child", "newer", "undated"]);
    }

    #[test]
    fn cycle_leftovers_follow_creation_time() {
        let day = |d: u32| Utc.with_ymd_and_hms(2026, 1, d, 0, 0, 0).unwrap();
        let concepts = vec![
            Concept::new("a").with_prerequisites(&["b"]),
            Concept::new("b")
                .with_prerequisites(&["a"])
                .with_created_at(day(2)),
        ];
        assert_eq!(ids(&concepts), vec!["b", "a"]);
    }

    #[test]
    fn attach_prerequisites_merges_edges() {
        let mut concepts = vec![
            Concept::new("a"),
            Concept::new("b").with_prerequisites(&["a"]),
        ];
        let edges = vec![
            PrerequisiteEdge {
                concept_id: "b".to_string(),
                prerequisite_concept_id: "a".to_string(),
            },
            PrerequisiteEdge {
                concept_id: "b".to_string(),
                prerequisite_concept_id: "c".to_string(),
            },
        ];
        attach_prerequisites(&mut concepts, &edges);
        assert!(concepts[0].prerequisite_ids.is_empty());
        assert_eq!(concepts[1].prerequisite_ids, vec!["a", "c"]);
    }
}
