//! Tick List entry point
//!
//! Web: renders the list into the page and forwards clicks/keys to the
//! controller. Native: a line-oriented front end over a file store.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlInputElement, KeyboardEvent};

    use tick_list::persistence::LocalStorageStore;
    use tick_list::platform::BrowserConfirm;
    use tick_list::{Change, ItemAction, ItemId, PersistentStore, Settings, Snapshot, TodoList};

    type List = TodoList<LocalStorageStore>;

    /// Static page elements the renderer updates
    #[derive(Clone)]
    struct View {
        document: Document,
        draft: HtmlInputElement,
        add_btn: Element,
        update_btn: Element,
        list: Element,
        footer: Element,
    }

    impl View {
        fn build(document: &Document) -> Result<Self, JsValue> {
            let root = match document.get_element_by_id("app") {
                Some(el) => el,
                None => {
                    let body = document.body().ok_or("document has no body")?;
                    let el = document.create_element("div")?;
                    el.set_id("app");
                    body.append_child(&el)?;
                    el
                }
            };

            let title = document.create_element("h2")?;
            title.set_text_content(Some("TODO List"));
            root.append_child(&title)?;

            let draft: HtmlInputElement = document.create_element("input")?.dyn_into()?;
            draft.set_type("text");
            draft.set_placeholder("What needs doing?");
            root.append_child(&draft)?;

            let add_btn = document.create_element("button")?;
            add_btn.set_text_content(Some("Add"));
            root.append_child(&add_btn)?;

            let update_btn = document.create_element("button")?;
            update_btn.set_text_content(Some("Update"));
            update_btn.set_attribute("class", "hidden")?;
            root.append_child(&update_btn)?;

            let list = document.create_element("ul")?;
            root.append_child(&list)?;

            let footer = document.create_element("div")?;
            root.append_child(&footer)?;

            let clear_btn = document.create_element("button")?;
            clear_btn.set_id("clear-btn");
            clear_btn.set_text_content(Some("Clear All"));
            root.append_child(&clear_btn)?;

            Ok(Self {
                document: document.clone(),
                draft,
                add_btn,
                update_btn,
                list,
                footer,
            })
        }

        /// Sync the shared input and the Add/Update buttons
        fn render_draft(&self, snap: &Snapshot<'_>) -> Result<(), JsValue> {
            if self.draft.value() != snap.draft {
                self.draft.set_value(snap.draft);
            }

            let editing = snap.editing.is_some();
            self.add_btn
                .set_attribute("class", if editing { "hidden" } else { "" })?;
            self.update_btn
                .set_attribute("class", if editing { "" } else { "hidden" })?;
            Ok(())
        }

        /// Bring the DOM in line with the controller state. Item controls
        /// only carry `data-*` attributes; the list-level listener dispatches.
        fn render(&self, snap: &Snapshot<'_>) -> Result<(), JsValue> {
            self.render_draft(snap)?;

            self.list.set_inner_html("");
            for item in snap.items {
                let id = item.id.to_string();
                let li = self.document.create_element("li")?;
                if snap.editing == Some(item.id) {
                    li.set_attribute("class", "editing")?;
                }

                let check: HtmlInputElement = self.document.create_element("input")?.dyn_into()?;
                check.set_type("checkbox");
                check.set_checked(item.completed);
                check.set_attribute("data-action", ItemAction::Toggle.as_str())?;
                check.set_attribute("data-id", &id)?;
                li.append_child(&check)?;

                let text = self.document.create_element("span")?;
                text.set_text_content(Some(&item.text));
                if item.completed {
                    text.set_attribute("class", "completed")?;
                }
                li.append_child(&text)?;

                for (action, label) in [(ItemAction::Edit, "Edit"), (ItemAction::Delete, "Delete")] {
                    let btn = self.document.create_element("button")?;
                    btn.set_text_content(Some(label));
                    btn.set_attribute("data-action", action.as_str())?;
                    btn.set_attribute("data-id", &id)?;
                    li.append_child(&btn)?;
                }

                self.list.append_child(&li)?;
            }

            let remaining = snap.items.iter().filter(|i| !i.completed).count();
            let noun = if remaining == 1 { "item" } else { "items" };
            self.footer
                .set_text_content(Some(&format!("{} {} left", remaining, noun)));
            Ok(())
        }
    }

    /// Read `data-action`/`data-id` off an event target inside the list.
    /// Checkboxes answer to `change`, buttons to `click`.
    fn item_intent(event: &web_sys::Event) -> Option<(ItemAction, ItemId)> {
        let target: Element = event.target()?.dyn_into().ok()?;
        let action = ItemAction::from_str(&target.get_attribute("data-action")?)?;
        let id = target.get_attribute("data-id")?.parse().ok().map(ItemId)?;

        let expected = match action {
            ItemAction::Toggle => "change",
            ItemAction::Edit | ItemAction::Delete => "click",
        };
        (event.type_() == expected).then_some((action, id))
    }

    /// Add or commit depending on edit mode
    fn submit(list: &mut List) {
        if list.editing().is_some() {
            list.commit_edit();
        } else {
            let draft = list.draft().to_string();
            list.add(&draft);
        }
    }

    fn setup_controls(view: &View, app: &Rc<RefCell<List>>) -> Result<(), JsValue> {
        // One delegated listener for every item control, present or future
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                if let Some((action, id)) = item_intent(&event) {
                    app.borrow_mut().apply(action, id);
                }
            });
            for kind in ["click", "change"] {
                view.list
                    .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
            }
            closure.forget();
        }

        // Draft binding
        {
            let app = app.clone();
            let input = view.draft.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().set_draft(input.value());
            });
            view.draft
                .add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Enter submits, Escape abandons an edit
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.key().as_str() {
                    "Enter" => submit(&mut app.borrow_mut()),
                    "Escape" => app.borrow_mut().cancel_edit(),
                    _ => {}
                }
            });
            view.draft
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        for btn in [&view.add_btn, &view.update_btn] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                submit(&mut app.borrow_mut());
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        if let Some(btn) = view.document.get_element_by_id("clear-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                app.borrow_mut().clear_all(&mut BrowserConfirm);
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        let mut store = LocalStorageStore::new();
        let settings = Settings::load(&store);
        let level = settings.log_level().to_level().unwrap_or(log::Level::Error);
        if console_log::init_with_level(level).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }

        log::info!("Tick List starting...");
        if !LocalStorageStore::is_available() {
            log::warn!("LocalStorage unavailable, changes will not survive a reload");
        }
        // First run writes defaults so they can be edited in dev tools
        if store.load(Settings::STORAGE_KEY).ok().flatten().is_none() {
            settings.save(&mut store);
        }

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document")?;
        let view = View::build(&document)?;

        let app = Rc::new(RefCell::new(TodoList::new(store, &settings)));

        {
            let view = view.clone();
            app.borrow_mut().subscribe(move |change, snap| {
                let result = match change {
                    Change::DraftChanged => view.render_draft(snap),
                    _ => view.render(snap),
                };
                if let Err(e) = result {
                    log::error!("Render failed: {:?}", e);
                }
            });
        }
        view.render(&app.borrow().snapshot())?;
        // Listeners keep the controller alive for the page lifetime
        setup_controls(&view, &app)?;

        log::info!("Tick List running!");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    web_app::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod terminal {
    use std::cell::Cell;
    use std::io::{self, BufRead, Write};
    use std::rc::Rc;

    use tick_list::platform::{Clock, TerminalConfirm};
    use tick_list::{ItemAction, ItemId, PersistentStore, TodoList};

    const HELP: &str = "\
commands:
  add <text>     add an item
  ls             show the list
  done <n>       toggle item n
  edit <n>       replace the text of item n (empty line keeps it)
  rm <n>         delete item n
  clear          delete every item (asks first)
  help           this text
  quit           exit";

    fn print_list<S: PersistentStore, C: Clock>(
        list: &TodoList<S, C>,
        out: &mut impl Write,
    ) -> io::Result<()> {
        if list.is_empty() {
            return writeln!(out, "(empty)");
        }
        for (n, item) in list.items().iter().enumerate() {
            let mark = if item.completed { 'x' } else { ' ' };
            writeln!(out, "{:>3}. [{}] {}", n + 1, mark, item.text)?;
        }
        writeln!(out, "{} left", list.remaining())
    }

    /// Resolve a 1-based position to an item id
    fn nth<S: PersistentStore, C: Clock>(list: &TodoList<S, C>, arg: &str) -> Option<ItemId> {
        let n: usize = arg.trim().parse().ok()?;
        list.items().get(n.checked_sub(1)?).map(|item| item.id)
    }

    /// Read commands until EOF or `quit`
    pub fn run<S: PersistentStore, C: Clock>(
        list: &mut TodoList<S, C>,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> io::Result<()> {
        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        let sub = list.subscribe(move |_, _| flag.set(true));

        print_list(list, out)?;
        let mut line = String::new();
        loop {
            write!(out, "> ")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();
            let (cmd, arg) = line.split_once(' ').unwrap_or((line, ""));

            match cmd {
                "" => continue,
                "quit" | "exit" => break,
                "help" => writeln!(out, "{}", HELP)?,
                "ls" | "list" => print_list(list, out)?,
                "add" => {
                    if list.add(arg).is_none() {
                        writeln!(out, "nothing to add")?;
                    }
                }
                "done" | "rm" | "edit" => {
                    let Some(id) = nth(list, arg) else {
                        writeln!(out, "no item {:?}", arg)?;
                        continue;
                    };
                    match cmd {
                        "done" => {
                            list.apply(ItemAction::Toggle, id);
                        }
                        "rm" => {
                            list.apply(ItemAction::Delete, id);
                        }
                        _ => {
                            list.apply(ItemAction::Edit, id);
                            writeln!(out, "current: {}", list.draft())?;
                            write!(out, "new text: ")?;
                            out.flush()?;
                            let mut text = String::new();
                            input.read_line(&mut text)?;
                            list.set_draft(text);
                            if !list.commit_edit() {
                                writeln!(out, "unchanged")?;
                            }
                        }
                    }
                }
                "clear" => {
                    let mut confirm = TerminalConfirm::new(&mut *input, &mut *out);
                    list.clear_all(&mut confirm);
                }
                other => writeln!(out, "unknown command {:?} (try help)", other)?,
            }

            if dirty.replace(false) {
                print_list(list, out)?;
            }
        }

        list.unsubscribe(sub);
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::io;
    use tick_list::persistence::FileStore;
    use tick_list::{Settings, TodoList};

    let dir = std::env::var("TICK_LIST_DIR").unwrap_or_else(|_| ".tick-list".to_string());
    let store = FileStore::new(dir);
    let settings = Settings::load(&store);

    env_logger::Builder::new()
        .filter_level(settings.log_level())
        .parse_default_env()
        .init();
    log::info!("Tick List (native) starting, data in {}", store.dir().display());

    let mut list = TodoList::new(store, &settings);
    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = terminal::run(&mut list, &mut stdin.lock(), &mut stdout.lock()) {
        log::error!("Terminal error: {}", e);
    }
    list.shutdown();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
