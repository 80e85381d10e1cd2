//! Pure derivations from the graph to GeoJSON feature collections.

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

use super::model::{Edge, Graph, Node};
use crate::error::{EditorError, Result};
use crate::geodesy::LngLat;

fn feature(id: i64, value: Value, properties: JsonObject) -> Feature {
	Feature {
		bbox: None,
		geometry: Some(Geometry::new(value)),
		id: Some(Id::Number(id.into())),
		properties: Some(properties),
		foreign_members: None,
	}
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
	FeatureCollection {
		bbox: None,
		features,
		foreign_members: None,
	}
}

fn point(node: &Node) -> Value {
	Value::Point(node.position.to_position())
}

/// Two-point line between the edge's endpoints, or an empty line when either
/// endpoint is missing from the graph.
fn segment(graph: &Graph, edge: &Edge) -> Value {
	match (graph.position_of(edge.source), graph.position_of(edge.target)) {
		(Some(a), Some(b)) => Value::LineString(vec![a.to_position(), b.to_position()]),
		_ => Value::LineString(Vec::new()),
	}
}

fn edge_properties(edge: &Edge) -> JsonObject {
	let mut props = JsonObject::new();
	props.insert("id".into(), json!(edge.id));
	props.insert("source".into(), json!(edge.source));
	props.insert("target".into(), json!(edge.target));
	props
}

/// Render layer for nodes: one `Point` per node, feature id = node id.
pub fn nodes_collection(graph: &Graph) -> FeatureCollection {
	collection(
		graph
			.nodes()
			.iter()
			.map(|n| feature(n.id, point(n), JsonObject::new()))
			.collect(),
	)
}

/// Render layer for edges: one `LineString` per edge, feature id = edge id.
pub fn edges_collection(graph: &Graph) -> FeatureCollection {
	collection(
		graph
			.edges()
			.iter()
			.map(|e| feature(e.id, segment(graph, e), edge_properties(e)))
			.collect(),
	)
}

/// Render layer for the in-progress edge: empty, or one line from the anchor
/// to the cursor.
pub fn preview_collection(segment: Option<(LngLat, LngLat)>) -> FeatureCollection {
	let features = segment
		.map(|(from, to)| Feature {
			bbox: None,
			geometry: Some(Geometry::new(Value::LineString(vec![
				from.to_position(),
				to.to_position(),
			]))),
			id: None,
			properties: Some(JsonObject::new()),
			foreign_members: None,
		})
		.into_iter()
		.collect();
	collection(features)
}

/// Export document: all nodes, then all edges. Node features carry the id as
/// feature id and in `properties.id`. Edge ids share a number space with node
/// ids, so edge features carry `id`, `source` and `target` in `properties`
/// only and the feature ids stay unique.
pub fn export_feature_collection(graph: &Graph) -> FeatureCollection {
	let nodes = graph.nodes().iter().map(|n| {
		let mut props = JsonObject::new();
		props.insert("id".into(), json!(n.id));
		feature(n.id, point(n), props)
	});
	let edges = graph.edges().iter().map(|e| Feature {
		id: None,
		..feature(e.id, segment(graph, e), edge_properties(e))
	});
	collection(nodes.chain(edges).collect())
}

/// [`export_feature_collection`] encoded as compact JSON text.
pub fn export_geojson_string(graph: &Graph) -> Result<String> {
	serde_json::to_string(&export_feature_collection(graph))
		.map_err(|err| EditorError::Export(err.to_string()))
}
