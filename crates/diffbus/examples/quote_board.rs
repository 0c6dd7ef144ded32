//! Track a list of price quotes, showing the top of the book through a
//! bounded window while the full list keeps churning.
//!
//! Run with: cargo run --example quote_board

use diffbus::{BoundedPrefix, SeqDispatcher, SeqListener};

fn main() {
    let dispatcher = SeqDispatcher::new();

    // The display only ever shows the best three quotes.
    let display = SeqListener::new();
    dispatcher.add_listener(BoundedPrefix::new(display.clone(), 3));

    // A full-depth listener for comparison.
    let depth = SeqListener::new();
    dispatcher.add_listener(depth.clone());

    {
        let _batch = dispatcher.batch();
        dispatcher.insert(0, "100.25");
        dispatcher.insert(1, "100.10");
        dispatcher.insert(2, "100.05");
        dispatcher.insert(3, "99.90"); // outside the window: display unaffected
        dispatcher.insert(0, "100.40"); // new best quote pushes one out
    }

    let forwarded = display.take_pending();
    depth.take_pending();

    println!("window diffs : {forwarded:?}");
    println!("top of book  : {:?}", display.snapshot());
    println!("full depth   : {:?}", depth.snapshot());

    // The best quote gets hit; the window refills from hidden depth.
    dispatcher.erase(0);
    let refill = display.take_pending();
    println!("after erase  : {refill:?}");
    println!("top of book  : {:?}", display.snapshot());
}
