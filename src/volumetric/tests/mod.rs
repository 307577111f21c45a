mod test_queries_basic;
