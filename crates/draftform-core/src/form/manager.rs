//! Form adapter managing the lifecycle of form items.

use super::item::{FormItem, FormItemState};
use super::{FormStates, FormValues};
use crate::events::{ListenerId, Listeners};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// Identifier assigned to an item when it joins a form.
pub type FormItemId = Uuid;

/// A rendering target for form items.
pub trait FormContainer {
    /// Show an item, given its property bag.
    fn mount(&mut self, id: FormItemId, props: &Value);

    /// Remove an item from view.
    fn unmount(&mut self, id: FormItemId);
}

struct Entry {
    id: FormItemId,
    item: Box<dyn FormItem>,
}

/// Last known state of one member item.
struct Snapshot {
    id: FormItemId,
    name: String,
    state: FormItemState,
}

/// Per-item snapshots in form order and the aggregate listeners, shared with
/// the listeners installed on each item.
#[derive(Default)]
struct Broadcast {
    items: Vec<Snapshot>,
    values_changed: Listeners<FormValues>,
    states_changed: Listeners<FormStates>,
}

impl Broadcast {
    fn snapshot_mut(&mut self, id: FormItemId) -> Option<&mut Snapshot> {
        self.items.iter_mut().find(|snapshot| snapshot.id == id)
    }

    /// Same projection as [`FormManager::form_values`].
    fn values(&self) -> FormValues {
        self.items
            .iter()
            .map(|snapshot| (snapshot.name.clone(), snapshot.state.value.clone()))
            .collect()
    }

    fn states(&self) -> FormStates {
        self.items
            .iter()
            .map(|snapshot| (snapshot.name.clone(), snapshot.state.clone()))
            .collect()
    }

    fn item_value_changed(&mut self, id: FormItemId, value: &Value) {
        let Some(snapshot) = self.snapshot_mut(id) else {
            return;
        };
        snapshot.state.value = value.clone();
        let values = self.values();
        self.values_changed.emit(&values);
    }

    fn item_state_changed(&mut self, id: FormItemId, state: &FormItemState) {
        let Some(snapshot) = self.snapshot_mut(id) else {
            return;
        };
        snapshot.state = state.clone();
        let states = self.states();
        self.states_changed.emit(&states);
    }

    fn publish(&mut self, items: Vec<Snapshot>) {
        self.items = items;
        let values = self.values();
        let states = self.states();
        self.values_changed.emit(&values);
        self.states_changed.emit(&states);
    }
}

/// Manages an ordered collection of form items.
///
/// Items are owned by the manager once added. Any value change on a member
/// item, whether routed through the manager or made on the item directly,
/// re-broadcasts the aggregated form values to `on_form_values_changed`
/// listeners.
pub struct FormManager {
    container: Option<Box<dyn FormContainer>>,
    items: Vec<Entry>,
    item_added: Listeners<dyn FormItem>,
    item_removed: Listeners<dyn FormItem>,
    broadcast: Rc<RefCell<Broadcast>>,
}

impl Default for FormManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FormManager {
    pub fn new() -> Self {
        Self {
            container: None,
            items: Vec::new(),
            item_added: Listeners::new(),
            item_removed: Listeners::new(),
            broadcast: Rc::new(RefCell::new(Broadcast::default())),
        }
    }

    /// Bind a rendering target. Current items are mounted on it right away.
    /// Returns the previously bound container.
    pub fn initialize(&mut self, mut container: Box<dyn FormContainer>) -> Option<Box<dyn FormContainer>> {
        for entry in &self.items {
            container.mount(entry.id, &entry.item.component_props());
        }
        self.container.replace(container)
    }

    pub fn container(&self) -> Option<&dyn FormContainer> {
        self.container.as_deref()
    }

    /// Append an item to the form.
    pub fn add_form_item(&mut self, mut item: Box<dyn FormItem>) -> FormItemId {
        let id = Uuid::new_v4();
        self.attach(id, item.as_mut());
        log::debug!("Adding form item '{}' ({})", item.name(), id);

        if let Some(container) = self.container.as_mut() {
            container.mount(id, &item.component_props());
        }
        self.item_added.emit(&*item);
        self.items.push(Entry { id, item });
        self.notify_form_changed();
        id
    }

    /// Append several items, in order.
    pub fn add_form_items(&mut self, items: Vec<Box<dyn FormItem>>) -> Vec<FormItemId> {
        items
            .into_iter()
            .map(|item| self.add_form_item(item))
            .collect()
    }

    /// Remove an item. The removed item is destroyed and handed back.
    pub fn remove_form_item(&mut self, id: FormItemId) -> Option<Box<dyn FormItem>> {
        let item = self.take(id)?;
        self.notify_form_changed();
        Some(item)
    }

    /// Remove several items, broadcasting the new values once at the end.
    /// Unknown ids are skipped.
    pub fn remove_form_items(&mut self, ids: &[FormItemId]) -> Vec<Box<dyn FormItem>> {
        let removed: Vec<_> = ids.iter().filter_map(|&id| self.take(id)).collect();
        self.notify_form_changed();
        removed
    }

    /// Remove the first item with this name.
    pub fn remove_form_item_by_name(&mut self, name: &str) -> Option<Box<dyn FormItem>> {
        let id = self.id_of(name)?;
        self.remove_form_item(id)
    }

    pub fn form_items(&self) -> impl Iterator<Item = &(dyn FormItem + 'static)> + '_ {
        self.items.iter().map(|entry| &*entry.item)
    }

    /// Ids of all items, in form order.
    pub fn form_item_ids(&self) -> Vec<FormItemId> {
        self.items.iter().map(|entry| entry.id).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn form_item(&self, id: FormItemId) -> Option<&dyn FormItem> {
        self.items
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &*entry.item)
    }

    pub fn form_item_mut(&mut self, id: FormItemId) -> Option<&mut dyn FormItem> {
        let entry = self.items.iter_mut().find(|entry| entry.id == id)?;
        let item: &mut dyn FormItem = entry.item.as_mut();
        Some(item)
    }

    /// First item with this name.
    pub fn form_item_by_name(&self, name: &str) -> Option<&dyn FormItem> {
        self.items
            .iter()
            .find(|entry| entry.item.name() == name)
            .map(|entry| &*entry.item)
    }

    pub fn form_item_by_name_mut(&mut self, name: &str) -> Option<&mut dyn FormItem> {
        let entry = self.items.iter_mut().find(|entry| entry.item.name() == name)?;
        let item: &mut dyn FormItem = entry.item.as_mut();
        Some(item)
    }

    /// Id of the first item with this name.
    pub fn id_of(&self, name: &str) -> Option<FormItemId> {
        self.items
            .iter()
            .find(|entry| entry.item.name() == name)
            .map(|entry| entry.id)
    }

    /// Validate every item. All items are validated even after a failure.
    pub fn validate_all(&mut self) -> bool {
        let results: Vec<bool> = self
            .items
            .iter_mut()
            .map(|entry| entry.item.validate())
            .collect();
        let valid = results.iter().all(|&ok| ok);
        log::debug!(
            "Validated {} form items: {}",
            results.len(),
            if valid { "valid" } else { "invalid" }
        );
        valid
    }

    /// Reset every item to its default value.
    pub fn reset_all(&mut self) {
        for entry in &mut self.items {
            entry.item.reset();
        }
        self.notify_form_changed();
    }

    /// Name-keyed values of all items. Later items win on duplicate names.
    pub fn form_values(&self) -> FormValues {
        self.items
            .iter()
            .map(|entry| (entry.item.name().to_string(), entry.item.value().clone()))
            .collect()
    }

    /// Name-keyed states of all items.
    pub fn form_states(&self) -> FormStates {
        self.items
            .iter()
            .map(|entry| (entry.item.name().to_string(), entry.item.state().clone()))
            .collect()
    }

    /// Set values by name. Names without a matching item are ignored.
    pub fn set_form_values(&mut self, values: &FormValues) {
        for (name, value) in values {
            match self.form_item_by_name_mut(name) {
                Some(item) => item.set_value(value.clone()),
                None => log::warn!("No form item named '{}', value ignored", name),
            }
        }
        self.notify_form_changed();
    }

    /// Route user input to an item, see [`FormItem::handle_change`].
    pub fn handle_change(&mut self, id: FormItemId, value: Value) -> bool {
        match self.form_item_mut(id) {
            Some(item) => {
                item.handle_change(value);
                true
            }
            None => false,
        }
    }

    /// Route a focus loss to an item, see [`FormItem::handle_blur`].
    pub fn handle_blur(&mut self, id: FormItemId) -> bool {
        match self.form_item_mut(id) {
            Some(item) => {
                item.handle_blur();
                true
            }
            None => false,
        }
    }

    /// Destroy and drop every item.
    pub fn clear(&mut self) {
        for mut entry in self.items.drain(..) {
            entry.item.destroy();
            if let Some(container) = self.container.as_mut() {
                container.unmount(entry.id);
            }
        }
        self.notify_form_changed();
    }

    pub fn on_form_item_added(&mut self, mut callback: impl FnMut(&dyn FormItem) + 'static) -> ListenerId {
        self.item_added
            .add(move |item: &(dyn FormItem + 'static)| callback(item))
    }

    pub fn on_form_item_removed(&mut self, mut callback: impl FnMut(&dyn FormItem) + 'static) -> ListenerId {
        self.item_removed
            .add(move |item: &(dyn FormItem + 'static)| callback(item))
    }

    pub fn on_form_values_changed(&mut self, callback: impl FnMut(&FormValues) + 'static) -> ListenerId {
        self.broadcast.borrow_mut().values_changed.add(callback)
    }

    pub fn on_form_states_changed(&mut self, callback: impl FnMut(&FormStates) + 'static) -> ListenerId {
        self.broadcast.borrow_mut().states_changed.add(callback)
    }

    /// Unsubscribe a callback registered with any of the `on_*` methods.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        if self.item_added.remove(id) || self.item_removed.remove(id) {
            return true;
        }
        let mut broadcast = self.broadcast.borrow_mut();
        broadcast.values_changed.remove(id) || broadcast.states_changed.remove(id)
    }

    fn attach(&self, id: FormItemId, item: &mut dyn FormItem) {
        let broadcast = Rc::clone(&self.broadcast);
        item.on_change(Box::new(move |value: &Value| {
            broadcast.borrow_mut().item_value_changed(id, value);
        }));

        let broadcast = Rc::clone(&self.broadcast);
        item.on_state_change(Box::new(move |state: &FormItemState| {
            broadcast.borrow_mut().item_state_changed(id, state);
        }));
    }

    /// Detach an item without broadcasting the new values.
    fn take(&mut self, id: FormItemId) -> Option<Box<dyn FormItem>> {
        let pos = self.items.iter().position(|entry| entry.id == id)?;
        let Entry { id, mut item } = self.items.remove(pos);
        log::debug!("Removing form item '{}' ({})", item.name(), id);

        item.destroy();
        if let Some(container) = self.container.as_mut() {
            container.unmount(id);
        }
        self.item_removed.emit(&*item);
        Some(item)
    }

    fn notify_form_changed(&mut self) {
        let snapshots = self
            .items
            .iter()
            .map(|entry| Snapshot {
                id: entry.id,
                name: entry.item.name().to_string(),
                state: entry.item.state().clone(),
            })
            .collect();
        self.broadcast.borrow_mut().publish(snapshots);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormItemConfig, InputFormItem, InputFormItemConfig, InputType};
    use serde_json::json;

    fn username() -> Box<dyn FormItem> {
        Box::new(InputFormItem::new(
            InputFormItemConfig::new(FormItemConfig::new("username", "Username").required())
                .with_min_length(3)
                .with_max_length(20),
        ))
    }

    fn email() -> Box<dyn FormItem> {
        Box::new(InputFormItem::new(
            InputFormItemConfig::new(FormItemConfig::new("email", "Email").required())
                .with_type(InputType::Email),
        ))
    }

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl FnMut(&T) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        (log, move |event: &T| sink.borrow_mut().push(event.clone()))
    }

    #[derive(Default)]
    struct RecordingContainer {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl FormContainer for RecordingContainer {
        fn mount(&mut self, id: FormItemId, props: &Value) {
            self.log
                .borrow_mut()
                .push(format!("mount:{}:{}", props["config"]["name"], id));
        }

        fn unmount(&mut self, id: FormItemId) {
            self.log.borrow_mut().push(format!("unmount:{}", id));
        }
    }

    #[test]
    fn test_add_and_lookup() {
        let mut form = FormManager::new();
        let ids = form.add_form_items(vec![username(), email()]);

        assert_eq!(form.len(), 2);
        assert_eq!(form.form_item_ids(), ids);
        assert_eq!(form.form_item(ids[1]).unwrap().name(), "email");
        assert_eq!(form.form_item_by_name("username").unwrap().name(), "username");
        assert!(form.form_item_by_name("missing").is_none());
        assert_eq!(form.id_of("email"), Some(ids[1]));
        assert_eq!(
            form.form_items().map(|item| item.name().to_string()).collect::<Vec<_>>(),
            vec!["username", "email"]
        );
    }

    #[test]
    fn test_add_then_remove_restores_form() {
        let mut form = FormManager::new();
        form.add_form_item(username());
        let before_ids = form.form_item_ids();
        let before_values = form.form_values();

        let id = form.add_form_item(email());
        assert_ne!(form.form_values(), before_values);
        let removed = form.remove_form_item(id).unwrap();

        assert_eq!(removed.name(), "email");
        assert_eq!(form.form_item_ids(), before_ids);
        assert_eq!(form.form_values(), before_values);
        assert!(form.remove_form_item(id).is_none());
    }

    #[test]
    fn test_item_lifecycle_callbacks() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut form = FormManager::new();

        let sink = log.clone();
        form.on_form_item_added(move |item: &dyn FormItem| {
            sink.borrow_mut().push(format!("added:{}", item.name()))
        });
        let sink = log.clone();
        form.on_form_item_removed(move |item: &dyn FormItem| {
            sink.borrow_mut().push(format!("removed:{}", item.name()))
        });

        form.add_form_item(username());
        form.add_form_item(email());
        form.remove_form_item_by_name("username");
        form.remove_form_item_by_name("username");

        assert_eq!(
            *log.borrow(),
            vec!["added:username", "added:email", "removed:username"]
        );
    }

    #[test]
    fn test_values_changed_on_structure_and_input() {
        let (values, callback) = recorder::<FormValues>();
        let mut form = FormManager::new();
        form.on_form_values_changed(callback);

        let id = form.add_form_item(username());
        form.handle_change(id, json!("neo"));
        form.form_item_by_name_mut("username")
            .unwrap()
            .handle_change(json!("trinity"));

        let values = values.borrow();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0]["username"], json!(""));
        assert_eq!(values[1]["username"], json!("neo"));
        assert_eq!(values[2]["username"], json!("trinity"));
    }

    #[test]
    fn test_removed_item_is_detached() {
        let (values, callback) = recorder::<FormValues>();
        let mut form = FormManager::new();
        form.on_form_values_changed(callback);

        let id = form.add_form_item(username());
        let mut removed = form.remove_form_item(id).unwrap();
        let seen = values.borrow().len();

        removed.handle_change(json!("ghost"));

        assert_eq!(values.borrow().len(), seen);
        assert!(values.borrow().last().unwrap().is_empty());
    }

    #[test]
    fn test_remove_form_items_notifies_once() {
        let (values, callback) = recorder::<FormValues>();
        let mut form = FormManager::new();
        let ids = form.add_form_items(vec![username(), email()]);
        form.on_form_values_changed(callback);

        let removed = form.remove_form_items(&[ids[0], Uuid::new_v4(), ids[1]]);

        assert_eq!(removed.len(), 2);
        assert!(form.is_empty());
        assert_eq!(values.borrow().len(), 1);
    }

    #[test]
    fn test_validate_all() {
        let mut form = FormManager::new();
        let ids = form.add_form_items(vec![username(), email()]);

        assert!(!form.validate_all());
        // Every item was validated, not just the first failure.
        assert!(form.form_item(ids[0]).unwrap().state().error.is_some());
        assert!(form.form_item(ids[1]).unwrap().state().error.is_some());

        form.handle_change(ids[0], json!("neo"));
        assert!(!form.validate_all());

        form.handle_change(ids[1], json!("neo@matrix.io"));
        assert!(form.validate_all());
    }

    #[test]
    fn test_validate_all_empty_form() {
        assert!(FormManager::new().validate_all());
    }

    #[test]
    fn test_set_and_get_values() {
        let mut form = FormManager::new();
        form.add_form_items(vec![username(), email()]);

        let mut values = FormValues::new();
        values.insert("username".to_string(), json!("neo"));
        values.insert("unknown".to_string(), json!(42));
        form.set_form_values(&values);

        let current = form.form_values();
        assert_eq!(current["username"], json!("neo"));
        assert_eq!(current["email"], json!(""));
        assert!(!current.contains_key("unknown"));
    }

    #[test]
    fn test_reset_all_and_clear() {
        let mut form = FormManager::new();
        let ids = form.add_form_items(vec![username(), email()]);
        form.handle_change(ids[0], json!("neo"));
        form.handle_blur(ids[0]);
        assert!(form.form_item(ids[0]).unwrap().state().touched);

        form.reset_all();
        let state = form.form_item(ids[0]).unwrap().state();
        assert_eq!(state.value, json!(""));
        assert!(!state.touched);

        form.clear();
        assert!(form.is_empty());
        assert!(form.form_values().is_empty());
    }

    #[test]
    fn test_states_changed() {
        let (states, callback) = recorder::<FormStates>();
        let mut form = FormManager::new();
        let id = form.add_form_item(username());
        form.on_form_states_changed(callback);

        form.handle_blur(id);

        let states = states.borrow();
        let last = states.last().unwrap();
        assert!(last["username"].touched);
        assert_eq!(last["username"].error.as_deref(), Some("Username is required"));
        assert_eq!(form.form_states()["username"], last["username"]);
    }

    #[test]
    fn test_values_changed_sees_direct_set_value() {
        let (values, callback) = recorder::<FormValues>();
        let mut form = FormManager::new();
        let ids = form.add_form_items(vec![username(), email()]);
        form.on_form_values_changed(callback);

        form.form_item_mut(ids[0]).unwrap().set_value(json!("neo"));
        form.handle_change(ids[1], json!("a@b.co"));

        let values = values.borrow();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["username"], json!("neo"));
        assert_eq!(values[0]["email"], json!("a@b.co"));
        assert_eq!(values[0], form.form_values());
    }

    #[test]
    fn test_values_changed_matches_getter_on_duplicate_names() {
        let dup = || -> Box<dyn FormItem> {
            Box::new(InputFormItem::new(InputFormItemConfig::new(FormItemConfig::new(
                "dup", "Dup",
            ))))
        };
        let (values, callback) = recorder::<FormValues>();
        let mut form = FormManager::new();
        let ids = form.add_form_items(vec![dup(), dup()]);
        form.on_form_values_changed(callback);

        form.handle_change(ids[0], json!("first"));
        assert_eq!(values.borrow().last().unwrap()["dup"], json!(""));
        assert_eq!(*values.borrow().last().unwrap(), form.form_values());

        form.handle_change(ids[1], json!("second"));
        assert_eq!(values.borrow().last().unwrap()["dup"], json!("second"));
        assert_eq!(*values.borrow().last().unwrap(), form.form_values());
    }

    #[test]
    fn test_states_changed_matches_getter() {
        let (states, callback) = recorder::<FormStates>();
        let mut form = FormManager::new();
        let ids = form.add_form_items(vec![username(), email()]);
        form.on_form_states_changed(callback);

        form.form_item_mut(ids[0]).unwrap().set_value(json!("neo"));
        form.handle_blur(ids[1]);

        assert_eq!(*states.borrow().last().unwrap(), form.form_states());
    }

    #[test]
    fn test_remove_listener() {
        let (values, callback) = recorder::<FormValues>();
        let mut form = FormManager::new();
        let listener = form.on_form_values_changed(callback);

        assert!(form.remove_listener(listener));
        assert!(!form.remove_listener(listener));
        form.add_form_item(username());

        assert!(values.borrow().is_empty());
    }

    #[test]
    fn test_container_mounting() {
        let container = RecordingContainer::default();
        let log = container.log.clone();
        let mut form = FormManager::new();
        let first = form.add_form_item(username());

        assert!(form.initialize(Box::new(container)).is_none());
        assert!(form.container().is_some());
        let second = form.add_form_item(email());
        form.remove_form_item(first);

        assert_eq!(
            *log.borrow(),
            vec![
                format!("mount:\"username\":{first}"),
                format!("mount:\"email\":{second}"),
                format!("unmount:{first}"),
            ]
        );
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let mut form = FormManager::new();
        let stray = Uuid::new_v4();

        assert!(!form.handle_change(stray, json!("x")));
        assert!(!form.handle_blur(stray));
        assert!(form.form_item_mut(stray).is_none());
    }
}
