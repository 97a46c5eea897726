use crate::models::{CartLine, WishlistLine};

/// Product data needed to put something in the cart.
#[derive(Debug, Clone)]
pub struct CartProduct {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub image: String,
}

/// Client-side cart and wishlist.
///
/// `total_quantity` and `total_amount` are derived from `items` after every
/// change and are never sent to the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub items: Vec<CartLine>,
    pub wishlist: Vec<WishlistLine>,
    pub total_quantity: u32,
    pub total_amount: f64,
}

impl CartState {
    fn recompute(&mut self) {
        self.total_quantity = self.items.iter().map(|line| line.quantity).sum();
        self.total_amount = self.items.iter().map(|line| line.total_price).sum();
    }

    /// Adds `quantity` units, merging into an existing line for the same id.
    pub fn add_item(&mut self, product: CartProduct, quantity: u32) {
        let quantity = quantity.max(1);
        match self.items.iter_mut().find(|line| line.id == product.id) {
            Some(line) => line.set_quantity(line.quantity + quantity),
            None => self.items.push(CartLine::new(
                product.id,
                product.name,
                product.price,
                product.image,
                quantity,
            )),
        }
        self.recompute();
    }

    /// Takes one unit away; the line disappears when its last unit goes.
    pub fn remove_item(&mut self, id: &str) {
        if let Some(pos) = self.items.iter().position(|line| line.id == id) {
            let line = &mut self.items[pos];
            if line.quantity > 1 {
                line.set_quantity(line.quantity - 1);
            } else {
                self.items.remove(pos);
            }
        }
        self.recompute();
    }

    pub fn delete_item(&mut self, id: &str) {
        self.items.retain(|line| line.id != id);
        self.recompute();
    }

    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.recompute();
    }

    /// Returns whether the product is on the wishlist afterwards.
    pub fn toggle_wishlist(&mut self, line: WishlistLine) -> bool {
        match self.wishlist.iter().position(|w| w.id == line.id) {
            Some(pos) => {
                self.wishlist.remove(pos);
                false
            }
            None => {
                self.wishlist.push(line);
                true
            }
        }
    }

    /// Replaces everything with the server copy. Nothing local is merged in.
    pub fn replace(&mut self, items: Vec<CartLine>, wishlist: Vec<WishlistLine>) {
        self.items = items;
        for line in &mut self.items {
            line.set_quantity(line.quantity);
        }
        self.wishlist = wishlist;
        self.recompute();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: f64) -> CartProduct {
        CartProduct {
            id: id.into(),
            name: format!("Item {id}"),
            price,
            image: String::new(),
        }
    }

    fn wish(id: &str) -> WishlistLine {
        WishlistLine {
            id: id.into(),
            title: format!("Item {id}"),
            price: "$1.00".into(),
            image: String::new(),
        }
    }

    fn assert_line_totals(state: &CartState) {
        for line in &state.items {
            assert_eq!(line.total_price, line.price * f64::from(line.quantity), "line {}", line.id);
        }
    }

    #[test]
    fn line_totals_follow_every_mutation() {
        let mut cart = CartState::default();
        cart.add_item(product("1", 2.5), 1);
        cart.add_item(product("1", 2.5), 3);
        cart.add_item(product("2", 10.0), 0);
        assert_line_totals(&cart);
        assert_eq!(cart.items[0].quantity, 4);
        assert_eq!(cart.items[1].quantity, 1);

        cart.remove_item("1");
        assert_line_totals(&cart);
        assert_eq!(cart.items[0].total_price, 7.5);

        cart.remove_item("2");
        assert_eq!(cart.items.len(), 1);
        cart.delete_item("1");
        assert!(cart.items.is_empty());
        assert_eq!((cart.total_quantity, cart.total_amount), (0, 0.0));
    }

    #[test]
    fn totals_are_recomputed_from_lines() {
        let mut cart = CartState::default();
        cart.add_item(product("1", 2.5), 2);
        cart.add_item(product("2", 1.0), 3);
        assert_eq!(cart.total_quantity, 5);
        assert_eq!(cart.total_amount, 8.0);
    }

    #[test]
    fn double_toggle_restores_wishlist() {
        let mut cart = CartState::default();
        cart.toggle_wishlist(wish("a"));
        let before = cart.wishlist.clone();

        assert!(cart.toggle_wishlist(wish("b")));
        assert!(!cart.toggle_wishlist(wish("b")));
        assert_eq!(cart.wishlist, before);
    }

    #[test]
    fn replace_discards_local_items_and_repairs_totals() {
        let mut cart = CartState::default();
        cart.add_item(product("guest", 3.0), 1);

        let mut stale = CartLine::new("1", "Mug", 4.0, "", 2);
        stale.total_price = 0.0;
        cart.replace(vec![stale], vec![wish("w")]);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].id, "1");
        assert_eq!(cart.items[0].total_price, 8.0);
        assert_eq!(cart.total_amount, 8.0);
        assert_eq!(cart.wishlist.len(), 1);
    }
}
