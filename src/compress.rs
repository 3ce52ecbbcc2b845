//! Folding of binary layers into wide nodes.

use log::{debug, trace};

use crate::inner::{Children, Node, Slot};
use crate::PrefixTrie;

/// Parameters of [`PrefixTrie::compress_with`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Compression {
    /// Stop widening a node once the fraction of empty slots in the next layer would reach this
    /// value. Values above 1 are treated as 1, and NaN as the default.
    pub max_sparsity: f64,
    /// Smallest fan-out (in bits) worth creating a wide node for. Values below 2 are treated as 2.
    pub min_width: u8,
}

impl Default for Compression {
    fn default() -> Self {
        Self {
            max_sparsity: 0.5,
            min_width: 2,
        }
    }
}

impl Compression {
    /// `max_sparsity` limited to `(0, 1]`.
    fn sparsity_limit(&self) -> f64 {
        if self.max_sparsity.is_nan() {
            Self::default().max_sparsity
        } else {
            self.max_sparsity.clamp(f64::MIN_POSITIVE, 1.0)
        }
    }
}

impl<T> PrefixTrie<T> {
    /// Fold complete layers of single-bit branching nodes into wide nodes, using the default
    /// [`Compression`] parameters. Lookups return the same result before and after compression.
    ///
    /// Compress once after all prefixes are inserted. Calling it again only folds binary parts
    /// created by later insertions; already wide nodes are kept as they are.
    ///
    /// ```
    /// # use lpm_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut trie = PrefixTrie::new();
    /// for (i, p) in ["10.0.0.0/10", "10.64.0.0/10", "10.128.0.0/10", "10.192.0.0/10"].iter().enumerate() {
    ///     trie.insert(p.parse()?, i);
    /// }
    /// assert_eq!(trie.depth(), 3);
    /// trie.compress();
    /// assert!(trie.is_compressed());
    /// assert_eq!(trie.depth(), 2);
    /// assert_eq!(trie.lookup_ip("10.130.0.1".parse()?).map(|(_, v)| *v), Some(2));
    /// # Ok(())
    /// # }
    /// ```
    pub fn compress(&mut self) {
        self.compress_with(&Compression::default())
    }

    /// Same as [`Self::compress`], with custom parameters.
    pub fn compress_with(&mut self, config: &Compression) {
        let mut folded = 0;
        if let Some(root) = self.root.as_deref_mut() {
            compress_node(root, config, &mut folded);
        }
        debug!(
            "compressed trie with {} prefixes: {} wide nodes created, depth {}",
            self.len(),
            folded,
            self.depth()
        );
    }
}

fn compress_node<T>(node: &mut Node<T>, config: &Compression, folded: &mut usize) {
    let width = foldable_levels(node, config);
    if width >= config.min_width.max(2) {
        let children = std::mem::replace(&mut node.children, Children::Binary([None, None]));
        if let Children::Binary(children) = children {
            let mut slots = Vec::with_capacity(1 << width);
            for child in children {
                collect_layer(child, width - 1, &mut slots);
            }
            debug_assert_eq!(slots.len(), 1 << width);
            trace!("fold {:?} into {} slots", node.prefix, slots.len());
            node.children = Children::Wide { width, slots };
            *folded += 1;
        }
    }
    for child in node.slots_mut().iter_mut().flatten() {
        compress_node(child, config, folded);
    }
}

/// Count how many layers below `node` can be folded into a single wide node.
///
/// Layer 0 is `node` itself and layer `k + 1` holds the children of layer `k`. A layer `k > 0` can
/// only be expanded if all of its nodes are binary, carry no value, and are exactly `k` bits
/// longer than `node` (each of them consumes exactly one bit of the wide index). A wide node never
/// exceeds 64 bits of fan-out.
fn foldable_levels<T>(node: &Node<T>, config: &Compression) -> u8 {
    let max_sparsity = config.sparsity_limit();
    let base = node.prefix.prefix_len();
    let mut layer: Vec<Option<&Node<T>>> = vec![Some(node)];
    let mut levels: u8 = 0;

    loop {
        let len = base as u32 + levels as u32;
        if len >= 128 || levels >= 64 {
            break;
        }
        let expandable = layer.iter().flatten().all(|n| match &n.children {
            Children::Binary(_) => {
                (levels == 0 || n.value.is_none()) && n.prefix.prefix_len() as u32 == len
            }
            Children::Wide { .. } => false,
        });
        if !expandable {
            break;
        }

        let next: Vec<Option<&Node<T>>> = layer
            .iter()
            .flat_map(|entry| match entry {
                Some(n) => [n.slots()[0].as_deref(), n.slots()[1].as_deref()],
                None => [None, None],
            })
            .collect();
        let empty = next.iter().filter(|n| n.is_none()).count();
        if empty == next.len() || empty as f64 >= next.len() as f64 * max_sparsity {
            break;
        }

        layer = next;
        levels += 1;
    }

    levels
}

/// Move the slots of the layer `depth` levels below `slot` into `out`, in index order.
fn collect_layer<T>(slot: Slot<T>, depth: u8, out: &mut Vec<Slot<T>>) {
    if depth == 0 {
        out.push(slot);
        return;
    }
    match slot.map(|node| node.children) {
        None => out.extend(std::iter::repeat_with(|| None).take(1 << depth)),
        Some(Children::Binary(children)) => {
            for child in children {
                collect_layer(child, depth - 1, out);
            }
        }
        Some(Children::Wide { .. }) => unreachable!("only binary layers are folded"),
    }
}
