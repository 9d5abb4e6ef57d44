use {
    std::{
        collections::BTreeMap,
        fmt,
        fs::File,
        io::{BufReader, BufWriter},
        path::{Path, PathBuf},
    },
    serde::{Serialize, Deserialize},
    crate::error::*,
};

/// What an ordering ranks by
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
pub enum OrderingKind{
    Betweenness,
    Closeness,
    Degree,
    Eigenvector,
    RandomWalk,
    Referral,
}

impl OrderingKind{
    pub fn short_name(self) -> &'static str
    {
        match self{
            Self::Betweenness => "BET",
            Self::Closeness => "CLO",
            Self::Degree => "DEG",
            Self::Eigenvector => "EIG",
            Self::RandomWalk => "RWK",
            Self::Referral => "REF",
        }
    }
}

/// Ranked once up front, or re-ranked after every removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
pub enum AttackMode{
    Simultaneous,
    Sequential,
}

impl AttackMode{
    pub fn from_sequential(sequential: bool) -> Self
    {
        if sequential {
            Self::Sequential
        } else {
            Self::Simultaneous
        }
    }

    pub fn short_name(self) -> &'static str
    {
        match self{
            Self::Simultaneous => "SIM",
            Self::Sequential => "SEQ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
pub struct OrderingKey{
    pub kind: OrderingKind,
    pub mode: AttackMode,
}

impl OrderingKey{
    pub fn new(kind: OrderingKind, mode: AttackMode) -> Self
    {
        Self{kind, mode}
    }
}

impl fmt::Display for OrderingKey{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}_{}", self.kind.short_name(), self.mode.short_name())
    }
}

/// All orderings of one network, written once and read by later simulations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderingStore{
    vertex_count: usize,
    orderings: BTreeMap<OrderingKey, Vec<usize>>,
}

impl OrderingStore{
    pub fn new(vertex_count: usize) -> Self
    {
        Self{
            vertex_count,
            orderings: BTreeMap::new()
        }
    }

    pub fn vertex_count(&self) -> usize
    {
        self.vertex_count
    }

    pub fn insert(&mut self, key: OrderingKey, ordering: Vec<usize>)
    {
        self.orderings.insert(key, ordering);
    }

    /// Fails instead of falling back to some other ordering
    pub fn get(&self, key: OrderingKey) -> SirResult<&[usize]>
    {
        self.orderings.get(&key)
            .map(Vec::as_slice)
            .ok_or(SirError::MissingOrdering(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OrderingKey, &Vec<usize>)>
    {
        self.orderings.iter()
    }

    pub fn len(&self) -> usize
    {
        self.orderings.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.orderings.is_empty()
    }

    /// Errors if the store belongs to a network of different size
    pub fn check_vertex_count(&self, network: usize) -> SirResult<()>
    {
        if self.vertex_count == network {
            Ok(())
        } else {
            Err(
                SirError::StoreMismatch{
                    stored: self.vertex_count,
                    network
                }
            )
        }
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> SirResult<()>
    {
        let file = File::create(path.as_ref())
            .map_err(|e| SirError::io(path.as_ref(), e))?;
        let buf = BufWriter::new(file);
        bincode::serialize_into(buf, self)?;
        Ok(())
    }

    pub fn read<P: AsRef<Path>>(path: P) -> SirResult<Self>
    {
        let file = File::open(path.as_ref())
            .map_err(|e| SirError::io(path.as_ref(), e))?;
        let buf = BufReader::new(file);
        Ok(bincode::deserialize_from(buf)?)
    }
}

/// `network.txt` -> `network.ord`
pub fn default_store_path<P: AsRef<Path>>(network: P) -> PathBuf
{
    network.as_ref().with_extension("ord")
}
