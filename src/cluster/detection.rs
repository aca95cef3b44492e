//! Community detection by edge-betweenness removal (Girvan–Newman)

use std::collections::{BTreeSet, HashMap, VecDeque};

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use rayon::prelude::*;

use crate::cluster::CommunityPartition;
use crate::graph::algorithms::extract_prefix;
use crate::graph::InteractionGraph;

/// Sources handled per parallel batch when scoring edges
const SOURCE_BATCH: usize = 64;

/// Relative tolerance when comparing edge scores, so float noise between
/// equally central edges does not decide which one is removed
const SCORE_TOLERANCE: f64 = 1e-9;

/// Union-Find data structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Size of each set (for union by size)
    rank: Vec<u32>,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            rank: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let px = self.parent[x as usize];
        if px != x {
            self.parent[x as usize] = self.find(px);
        }
        self.parent[x as usize]
    }

    /// Union the sets containing x and y
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        // Attach smaller tree under root of larger tree
        if self.rank[root_x as usize] > self.rank[root_y as usize] {
            self.parent[root_y as usize] = root_x;
            self.rank[root_x as usize] += self.rank[root_y as usize];
        } else {
            self.parent[root_x as usize] = root_y;
            self.rank[root_y as usize] += self.rank[root_x as usize];
        }
    }
}

type UndirectedSample = StableUnGraph<(), ()>;

/// Detect communities among the first `sample_size` authors.
///
/// The sample is deterministic (insertion order, not random) and is clamped to
/// the graph size. Reply direction is ignored and self-loops are dropped. One
/// Girvan–Newman step is run: the most central edge is removed until the
/// number of connected components grows, and those components are returned.
///
/// Authors nobody replied to do not stop the step: a sample made of one
/// connected group plus isolated authors is still split. A sample where two or
/// more components already carry edges is returned as those components unless
/// `split_disconnected` asks for a splitting step anyway.
pub fn detect_communities(
    graph: &InteractionGraph,
    sample_size: usize,
    split_disconnected: bool,
) -> CommunityPartition {
    let sample = extract_prefix(graph, sample_size);
    log::info!(
        "Detecting communities on a sample of {} of {} authors",
        sample.node_count,
        graph.node_count
    );

    let mut undirected = to_undirected(&sample);
    let (components, removed_edges) = first_partition(&mut undirected, split_disconnected);

    let communities: Vec<Vec<String>> = components
        .into_iter()
        .map(|members| members.into_iter().map(|node| sample.author(node).to_string()).collect())
        .collect();

    log::info!(
        "Found {} communities after removing {} edges",
        communities.len(),
        removed_edges
    );

    CommunityPartition {
        count: communities.len(),
        communities,
        sampled_nodes: sample.node_count,
        removed_edges,
    }
}

/// Undirected copy of the graph without self-loops. Edges are added in
/// (lower endpoint, higher endpoint) order, so edge indices follow that order.
fn to_undirected(graph: &InteractionGraph) -> UndirectedSample {
    let pairs: BTreeSet<(usize, usize)> = graph
        .edge_pairs()
        .filter(|(src, dst)| src != dst)
        .map(|(src, dst)| (src.min(dst), src.max(dst)))
        .collect();

    let mut undirected = UndirectedSample::with_capacity(graph.node_count, pairs.len());
    for _ in 0..graph.node_count {
        undirected.add_node(());
    }
    for (a, b) in pairs {
        undirected.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
    }

    undirected
}

/// Remove the most central edge until the component count grows.
/// Returns the components and the number of edges removed.
fn first_partition(graph: &mut UndirectedSample, split_disconnected: bool) -> (Vec<Vec<usize>>, usize) {
    let mut components = connected_components(graph);
    let initial = components.len();

    if graph.edge_count() == 0 {
        return (components, 0);
    }

    let linked = components.iter().filter(|members| members.len() > 1).count();
    if linked > 1 && !split_disconnected {
        return (components, 0);
    }

    let mut removed = 0;
    while graph.edge_count() > 0 {
        let Some(edge) = most_central_edge(graph) else {
            break;
        };
        graph.remove_edge(edge);
        removed += 1;

        components = connected_components(graph);
        if components.len() > initial {
            break;
        }
    }

    log::debug!("Girvan-Newman step removed {} edges", removed);
    (components, removed)
}

/// Connected components, each in node order, ordered by their first node
pub fn connected_components(graph: &UndirectedSample) -> Vec<Vec<usize>> {
    let node_count = graph.node_count();
    let mut sets = DisjointSets::new(node_count);

    for edge in graph.edge_indices() {
        if let Some((a, b)) = graph.edge_endpoints(edge) {
            sets.union(a.index() as u32, b.index() as u32);
        }
    }

    let mut position: HashMap<u32, usize> = HashMap::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    for node in 0..node_count {
        let root = sets.find(node as u32);
        let slot = *position.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(node);
    }

    components
}

/// Edge with the highest betweenness; ties go to the earliest edge
fn most_central_edge(graph: &UndirectedSample) -> Option<EdgeIndex> {
    let scores = edge_betweenness(graph);

    let mut best: Option<(EdgeIndex, f64)> = None;
    for edge in graph.edge_indices() {
        let score = scores[edge.index()];
        match best {
            Some((_, top)) if score <= top + SCORE_TOLERANCE * top.max(1.0) => {}
            _ => best = Some((edge, score)),
        }
    }

    best.map(|(edge, _)| edge)
}

/// Unnormalized shortest-path betweenness of every edge, indexed by edge index
pub fn edge_betweenness(graph: &UndirectedSample) -> Vec<f64> {
    let mut scores = vec![0.0; edge_bound(graph)];
    let sources: Vec<NodeIndex> = graph.node_indices().collect();

    for batch in sources.chunks(SOURCE_BATCH) {
        let partials: Vec<Vec<f64>> = batch
            .par_iter()
            .map(|&source| edge_dependencies(graph, source))
            .collect();

        for partial in partials {
            for (total, score) in scores.iter_mut().zip(partial) {
                *total += score;
            }
        }
    }

    scores
}

/// One past the highest live edge index
fn edge_bound(graph: &UndirectedSample) -> usize {
    graph.edge_indices().last().map_or(0, |edge| edge.index() + 1)
}

/// Edge dependencies accumulated from one source (Brandes, edge variant)
fn edge_dependencies(graph: &UndirectedSample, source: NodeIndex) -> Vec<f64> {
    // Nodes are never removed, so node indices are dense
    let n = graph.node_count();
    let mut scores = vec![0.0; edge_bound(graph)];

    let mut stack = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<(usize, EdgeIndex)>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist: Vec<i64> = vec![-1; n];

    let s = source.index();
    sigma[s] = 1.0;
    dist[s] = 0;

    let mut queue = VecDeque::new();
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        let vi = v.index();
        stack.push(vi);
        for edge in graph.edges(v) {
            let w = if edge.source() == v { edge.target() } else { edge.source() };
            let wi = w.index();
            if dist[wi] < 0 {
                dist[wi] = dist[vi] + 1;
                queue.push_back(w);
            }
            if dist[wi] == dist[vi] + 1 {
                sigma[wi] += sigma[vi];
                predecessors[wi].push((vi, edge.id()));
            }
        }
    }

    let mut delta = vec![0.0f64; n];
    while let Some(w) = stack.pop() {
        for &(v, edge) in &predecessors[w] {
            let share = sigma[v] / sigma[w] * (1.0 + delta[w]);
            scores[edge.index()] += share;
            delta[v] += share;
        }
    }

    scores
}
