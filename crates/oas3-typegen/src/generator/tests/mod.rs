mod schema_graph;
