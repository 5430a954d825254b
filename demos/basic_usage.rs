use memsearch::{
    paginate, remove_duplicates, DocumentStatus, RequestQueue, SearchEngine,
};

fn main() -> anyhow::Result<()> {
    println!("=== memsearch Basic Usage Example ===\n");

    // Create an engine with a few stop words
    let mut engine = SearchEngine::from_text("and in the with")?;

    // Insert some documents
    println!("Inserting documents...");
    engine.add_document(1, "curly cat and curly tail", DocumentStatus::Actual, &[7, 2, 7])?;
    engine.add_document(2, "funny pet with curly hair", DocumentStatus::Actual, &[1, 2, 3])?;
    engine.add_document(3, "funny pet and curly hair", DocumentStatus::Actual, &[1, 2])?;
    engine.add_document(4, "big snake in the terrarium", DocumentStatus::Banned, &[4, 4])?;
    println!("✓ Inserted {} documents\n", engine.document_count());

    // Example 1: Ranked search with the default (actual) status
    println!("--- Example 1: Search for 'curly pet' ---");
    for document in engine.find_top_documents("curly pet")? {
        println!("  {document}");
    }

    // Example 2: Minus words exclude documents
    println!("\n--- Example 2: Search for 'curly pet -hair' ---");
    for document in engine.find_top_documents("curly pet -hair")? {
        println!("  {document}");
    }

    // Example 3: Search with a custom predicate (even ids only)
    println!("\n--- Example 3: Search for 'curly' among even ids ---");
    let even = engine.find_top_documents_with("curly", |id, _, _| id % 2 == 0)?;
    for document in &even {
        println!("  {document}");
    }

    // Example 4: Match a document against a query
    println!("\n--- Example 4: Match 'funny curly snake' against document 2 ---");
    let (words, status) = engine.match_document("funny curly snake", 2)?;
    println!("  matched words: {words:?}, status: {status:?}");

    // Example 5: Word frequencies of a document
    println!("\n--- Example 5: Word frequencies of document 1 ---");
    for (word, frequency) in engine.word_frequencies(1) {
        println!("  {word}: {frequency:.3}");
    }

    // Example 6: Request log over the query API
    println!("\n--- Example 6: Request log ---");
    let mut requests = RequestQueue::new();
    requests.add_find_request(&engine, "curly pet")?;
    requests.add_find_request(&engine, "sparrow")?;
    println!(
        "  requests without results so far: {}",
        requests.no_result_requests()
    );

    // Example 7: Remove duplicates (documents 2 and 3 share a word set)
    println!("\n--- Example 7: Deduplicate ---");
    remove_duplicates(&mut engine);
    println!("  {} documents left", engine.document_count());

    // Example 8: Pagination of results
    println!("\n--- Example 8: Paginate 'curly' results, one per page ---");
    let results = engine.find_top_documents("curly")?;
    for (page_number, page) in paginate(&results, 1).iter().enumerate() {
        println!("  Page {}:", page_number + 1);
        for document in page {
            println!("    {document}");
        }
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
