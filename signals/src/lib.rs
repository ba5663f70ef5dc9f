/*!
Typed change-notification channels for strainer

# Design requirements:
- Senders and listeners are different handles: holding a `Ref` lets you listen, never send
- Listening returns a guard, and dropping the guard unsubscribes
- Listeners are called synchronously, in the order they subscribed
- No lock is held while a listener runs, so listeners may subscribe, unsubscribe or send again

# Nomenclature:
- `Broadcast<T>` - the sending side. Clones share the same listener set
- `ListenerGuard<T>` - proof of subscription. Drop it to stop listening
- `Subscribe<T>` - porcelain for types that expose a broadcast of their changes

# Basic usage

```rust
use strainer_signals::*;
use std::sync::{Arc, Mutex};

let broadcast = Broadcast::<u32>::new();
let seen = Arc::new(Mutex::new(Vec::new()));

let guard = {
    let seen = seen.clone();
    broadcast.reference().listen(move |value: u32| seen.lock().unwrap().push(value))
};

broadcast.send(1);
drop(guard);
broadcast.send(2);

assert_eq!(*seen.lock().unwrap(), vec![1]);
```
*/

pub mod broadcast;
pub mod porcelain;
pub mod value;

pub use broadcast::*;
pub use porcelain::subscribe::*;
pub use value::*;
