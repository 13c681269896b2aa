//! Estructura y validación del grafo de beakers y edges. Puramente
//! estructural: no posee los `Beaker` en sí (esos viven en el
//! motor/pipeline), sólo su topología y metadatos declarativos.

use indexmap::{IndexMap, IndexSet};

use crate::errors::GraphError;
use crate::model::BeakerSchema;

/// Metadatos declarados de un beaker dentro del grafo.
#[derive(Debug, Clone)]
pub struct BeakerNode {
    pub name: String,
    pub schema_name: &'static str,
    pub durable: bool,
}

/// Tipo de edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Transform,
    Splitter,
}

/// Declaración estructural de un edge. El comportamiento en tiempo de
/// ejecución (la función, el `error_map`, el `allow_filter`) vive en
/// `edge::Transform`/`edge::Splitter`; aquí sólo se registra la forma del
/// grafo para poder validarlo y para `graph_data`/`show`.
#[derive(Debug, Clone)]
pub struct EdgeDecl {
    pub name: String,
    pub kind: EdgeKind,
    pub from_beaker: String,
    /// Destinos normales (para Splitter, uno por rama del `splitter_map`).
    pub to_beakers: Vec<String>,
    /// Destinos adicionales declaradas vía `error_map`, que deben ser
    /// beakers durables de esquema error.
    pub error_destinations: Vec<String>,
    /// Esquema que el edge espera leer de `from_beaker`, si lo declara.
    /// `None` cuando el llamador no quiere esta validación (p. ej. grafos
    /// construidos en tests estructurales puros).
    pub input_schema: Option<&'static str>,
    /// Esquema que el edge produce para cada beaker en `to_beakers`.
    pub output_schema: Option<&'static str>,
}

/// Grafo validado de beakers y edges.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    beakers: IndexMap<String, BeakerNode>,
    edges: Vec<EdgeDecl>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_beaker(&mut self, node: BeakerNode) -> Result<(), GraphError> {
        if self.beakers.contains_key(&node.name) {
            return Err(GraphError::DuplicateBeaker(node.name));
        }
        self.beakers.insert(node.name.clone(), node);
        Ok(())
    }

    pub fn beaker(&self, name: &str) -> Option<&BeakerNode> {
        self.beakers.get(name)
    }

    pub fn beaker_names(&self) -> impl Iterator<Item = &str> {
        self.beakers.keys().map(String::as_str)
    }

    pub fn edges(&self) -> &[EdgeDecl] {
        &self.edges
    }

    pub fn edges_from(&self, beaker_name: &str) -> impl Iterator<Item = &EdgeDecl> {
        self.edges.iter().filter(move |e| e.from_beaker == beaker_name)
    }

    /// Registra un edge y revalida el grafo completo (aciclicidad +
    /// referencias a beakers declarados + destinos de error válidos).
    pub fn add_edge(&mut self, edge: EdgeDecl) -> Result<(), GraphError> {
        self.check_beaker_known(&edge.from_beaker)?;
        for to in edge.to_beakers.iter().chain(edge.error_destinations.iter()) {
            self.check_beaker_known(to)?;
        }
        self.check_schema_compatible(&edge)?;
        for err_dest in &edge.error_destinations {
            let node = self.beakers.get(err_dest).expect("checked above");
            if !node.durable || node.schema_name != crate::model::ErrorRecord::SCHEMA_NAME {
                return Err(GraphError::InvalidErrorDestination(err_dest.clone()));
            }
        }

        let mut trial = self.edges.clone();
        trial.push(edge.clone());
        Self::check_acyclic(&self.beakers, &trial)?;

        self.edges.push(edge);
        Ok(())
    }

    /// Compara el esquema declarado de un edge contra el de sus beakers
    /// de origen y destino, si el edge los declara.
    fn check_schema_compatible(&self, edge: &EdgeDecl) -> Result<(), GraphError> {
        if let Some(expected) = edge.input_schema {
            let from = self.beakers.get(&edge.from_beaker).expect("checked above");
            if from.schema_name != expected {
                return Err(GraphError::TypeMismatch {
                    edge: edge.name.clone(),
                    beaker: edge.from_beaker.clone(),
                    expected: expected.to_string(),
                    actual: from.schema_name.to_string(),
                });
            }
        }
        if let Some(expected) = edge.output_schema {
            for to in &edge.to_beakers {
                let node = self.beakers.get(to).expect("checked above");
                if node.schema_name != expected {
                    return Err(GraphError::TypeMismatch {
                        edge: edge.name.clone(),
                        beaker: to.clone(),
                        expected: expected.to_string(),
                        actual: node.schema_name.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_beaker_known(&self, name: &str) -> Result<(), GraphError> {
        if self.beakers.contains_key(name) {
            Ok(())
        } else {
            Err(GraphError::UnknownBeaker(name.to_string()))
        }
    }

    fn check_acyclic(
        beakers: &IndexMap<String, BeakerNode>,
        edges: &[EdgeDecl],
    ) -> Result<(), GraphError> {
        // DFS con pila de visita en curso; detecta el primer back-edge.
        let mut visiting: IndexSet<&str> = IndexSet::new();
        let mut done: IndexSet<&str> = IndexSet::new();

        fn visit<'a>(
            node: &'a str,
            beakers: &'a IndexMap<String, BeakerNode>,
            edges: &'a [EdgeDecl],
            visiting: &mut IndexSet<&'a str>,
            done: &mut IndexSet<&'a str>,
        ) -> Result<(), GraphError> {
            if done.contains(node) {
                return Ok(());
            }
            if !visiting.insert(node) {
                return Err(GraphError::CycleDetected {
                    from: node.to_string(),
                    to: node.to_string(),
                });
            }
            for edge in edges.iter().filter(|e| e.from_beaker == node) {
                for to in edge.to_beakers.iter().chain(edge.error_destinations.iter()) {
                    if visiting.contains(to.as_str()) {
                        return Err(GraphError::CycleDetected {
                            from: node.to_string(),
                            to: to.clone(),
                        });
                    }
                    visit(to.as_str(), beakers, edges, visiting, done)?;
                }
            }
            visiting.shift_remove(node);
            done.insert(node);
            Ok(())
        }

        for name in beakers.keys() {
            visit(name.as_str(), beakers, edges, &mut visiting, &mut done)?;
        }
        Ok(())
    }

    /// Orden topológico de los beakers, usado por el runner waterfall para
    /// procesar edges en orden de dependencia.
    pub fn topo_order(&self) -> Vec<String> {
        let mut in_degree: IndexMap<&str, usize> =
            self.beakers.keys().map(|n| (n.as_str(), 0)).collect();
        for edge in &self.edges {
            for to in edge.to_beakers.iter().chain(edge.error_destinations.iter()) {
                *in_degree.get_mut(to.as_str()).expect("validated edge") += 1;
            }
        }

        let mut queue: Vec<&str> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(n, _)| *n)
            .collect();
        queue.sort();

        let mut order = Vec::with_capacity(self.beakers.len());
        let mut idx = 0;
        while idx < queue.len() {
            let node = queue[idx];
            idx += 1;
            order.push(node.to_string());
            let mut newly_ready = Vec::new();
            for edge in self.edges_from(node) {
                for to in edge.to_beakers.iter().chain(edge.error_destinations.iter()) {
                    let deg = in_degree.get_mut(to.as_str()).expect("validated edge");
                    *deg -= 1;
                    if *deg == 0 {
                        newly_ready.push(to.as_str());
                    }
                }
            }
            newly_ready.sort();
            queue.extend(newly_ready);
        }
        order
    }
}
